mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();
    let result = runner::run();
    result.analyze().unwrap();
}
