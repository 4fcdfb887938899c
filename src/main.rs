use stresslab::error::AppResult;

fn main() -> AppResult<()> {
    stresslab::entry::run()
}
