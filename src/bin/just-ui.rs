use just_ui::cli::{run_cli, CliOutcome};
use just_ui::handoff;

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run_cli(args)? {
        CliOutcome::Print(text) => println!("{text}"),
        CliOutcome::Handoff(None) => {}
        CliOutcome::Handoff(Some(command)) => {
            let err = handoff::exec(&command);
            return Err(format!("failed to run `{}`: {err}", command.display()));
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
