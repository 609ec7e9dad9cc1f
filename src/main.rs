use treerouter::{cli, logging};

fn main() -> anyhow::Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: {e:#}");
    }
    cli::run_cli()
}
