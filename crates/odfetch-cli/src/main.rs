use odfetch_lib::cli::{parse_args, resolve_command, run_fetch};
use odfetch_lib::error::OdFetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), OdFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;
    run_fetch(params).await?;

    Ok(())
}
