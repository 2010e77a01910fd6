fn main() -> anyhow::Result<()> {
    bootrtt_cli::bootrtt()
}
