use qbrowse::{resolve, BrowseIdentity};

use crate::cmd::ResolveArgs;
use crate::exit::{browse_error, CliResult, SUCCESS};
use crate::output::{print_config, OutputFormat};

pub fn run(args: ResolveArgs, format: OutputFormat) -> CliResult<i32> {
    let identity = BrowseIdentity::new(
        args.identity.queue.as_str(),
        args.identity.user.as_str(),
        args.identity.access_key.as_str(),
    )
    .map_err(|err| browse_error("invalid identity", err.into()))?;
    let config = resolve(&identity, &args.identity.endpoint())
        .map_err(|err| browse_error("resolve failed", err.into()))?;

    print_config(config.queue_name(), &config.redacted(), format);
    Ok(SUCCESS)
}
