use std::process;

use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let matches = pagesim_cli::command().get_matches();
    match pagesim_cli::execute(&matches) {
        Ok(output) => {
            print!("{}", output.text);
            if let Some(diff) = output.mismatch {
                eprintln!("output does not match expected: {diff}");
                process::exit(1);
            }
        }
        Err(err) => {
            error!("run failed: {err:#}");
            eprintln!("Error: {err:#}");
            process::exit(2);
        }
    }
}
