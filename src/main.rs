use clap::Parser;
use legal_secretary::action::Args;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let directive = std::env::var("LOG")
        .unwrap_or_else(|_| "legal_secretary=info,legal_secretary_engine=info".into());
    if let Err(err) = legal_secretary::init_logs(&directive, true) {
        eprintln!("unable to initialize logs: {err}");
    }

    let args = Args::parse();
    let mut output = std::io::stdout();
    match args.execute(&mut output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("command failed: {:?}", err);
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
