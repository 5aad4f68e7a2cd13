use cityscope::DashboardError;

fn main() -> Result<(), DashboardError> {
    let stdout = std::io::stdout();
    cityscope::apps::run_cityscope(std::env::args().skip(1), &mut stdout.lock())
}
