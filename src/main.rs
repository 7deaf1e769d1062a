//! sievebench binary entry point.

fn main() -> anyhow::Result<()> {
    sievebench::cli::run()
}
