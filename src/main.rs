use smallsh::core::config::ShellConfig;
use smallsh::core::env::ProcessEnv;
use smallsh::flags::Flags;
use smallsh::input::LineReader;
use smallsh::shell::Shell;
use std::env;

fn main() -> Result<(), smallsh::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("smallsh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ShellConfig::load(&flags, &ProcessEnv)?;
    smallsh::logger::init(config.log_level)?;

    let reader = LineReader::from_stdin()?;
    let mut shell = Shell::new(config, reader)?;
    let code = shell.run()?;
    std::process::exit(code);
}
