use routeflow::cli::run_cli;
use routeflow::logging::init_logging;

fn main() {
    let _guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: {e:#}");
            None
        }
    };
    if let Err(e) = run_cli() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
