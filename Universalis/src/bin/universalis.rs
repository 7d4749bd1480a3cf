fn main() -> anyhow::Result<()> {
    universalis::cli::run_cli()
}
