use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// `-v`の指定回数からログレベルを決める。
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// ログの出力先を設定する。
///
/// 標準出力は表示に使うため、ログは標準エラー出力へ書き出す。
pub fn setup_logger(level: LevelFilter) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        // HTTPクライアントの内部ログは詳細すぎるため抑える
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
        .context("Failed to initialize logger")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use rstest::rstest;

    use super::level_from_verbosity;

    #[rstest]
    #[case(0, LevelFilter::Info)]
    #[case(1, LevelFilter::Debug)]
    #[case(2, LevelFilter::Trace)]
    #[case(5, LevelFilter::Trace)]
    fn test_level_from_verbosity(#[case] verbose: u8, #[case] expected: LevelFilter) {
        assert_eq!(level_from_verbosity(verbose), expected);
    }
}
