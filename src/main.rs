use colored::Colorize;
use sumtype_gen::cli::CommandLineInterface;

fn main() {
    sumtype_gen::init_tracing();
    let command_line_interface = CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
