use qbrowse::broker::Broker;
use qbrowse::message::StreamConfig;
use qbrowse::{BrowseIdentity, ClientConfig, QueueBrowserClient};
use tracing::{debug, warn};

use crate::cmd::BrowseArgs;
use crate::exit::{browse_error, CliResult, SUCCESS};
use crate::output::{print_messages, MessageRow, OutputFormat};
use crate::spool::Spool;

pub fn run(args: BrowseArgs, format: OutputFormat) -> CliResult<i32> {
    let broker = Spool::load(&args.spool)?.into_broker()?;

    let identity = BrowseIdentity::new(
        args.identity.queue.as_str(),
        args.identity.user.as_str(),
        args.identity.access_key.as_str(),
    )
    .map_err(|err| browse_error("invalid identity", err.into()))?;
    let config = ClientConfig {
        endpoint: args.identity.endpoint(),
        stream: StreamConfig::default(),
    };
    let mut client = QueueBrowserClient::with_config(broker, identity, &config)
        .map_err(|err| browse_error("invalid configuration", err))?;

    let rows = collect_rows(&mut client, args.limit);
    // Close even when reading failed.
    let closed = client.close_browser();
    let rows = rows?;
    if let Err(err) = closed {
        warn!(error = %err, "browse session did not close cleanly");
        return Err(browse_error("close failed", err));
    }

    print_messages(&args.identity.queue, &rows, format);
    Ok(SUCCESS)
}

fn collect_rows<B: Broker>(
    client: &mut QueueBrowserClient<B>,
    limit: Option<usize>,
) -> CliResult<Vec<MessageRow>> {
    let mut messages = Vec::new();
    for message in client
        .browse_queue()
        .map_err(|err| browse_error("browse failed", err))?
        .take(limit.unwrap_or(usize::MAX))
    {
        messages.push(message.map_err(|err| browse_error("browse failed", err))?);
    }

    let mut rows = Vec::with_capacity(messages.len());
    for (index, message) in messages.iter().enumerate() {
        let properties = client
            .message_properties(message)
            .map_err(|err| browse_error("reading properties failed", err))?;
        let content = client
            .message_content(message)
            .map_err(|err| browse_error(&format!("decoding message {index} failed"), err))?;
        rows.push(MessageRow {
            index,
            id: message.id().map(str::to_string),
            kind: client
                .message_content_type(message)
                .map_or("none", |kind| kind.as_str()),
            properties,
            content,
        });
    }
    debug!(messages = rows.len(), "queue browsed");
    Ok(rows)
}
