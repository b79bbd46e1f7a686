mod app;
mod audio;
mod config;
mod library;
mod runtime;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
