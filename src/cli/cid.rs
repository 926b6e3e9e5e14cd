use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use content_id::{to_gateway_url, to_uri, Codec, ContentId, ContentIdentifier, HashAlgorithm};
use serde::Serialize;

use super::context::CliContext;
use super::output::emit_structured;

#[derive(Args, Clone, Debug)]
pub struct CidArgs {
    /// Payload text
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// File whose bytes are the payload
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Codec written into the identifier: raw, dag-pb or dag-cbor
    #[arg(long)]
    pub codec: Option<Codec>,

    /// Hash algorithm: sha256, blake3 or fallback
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,

    /// Gateway host used for the HTTPS form
    #[arg(long)]
    pub gateway: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CidOutcome {
    cid: String,
    digest: String,
    algorithm: HashAlgorithm,
    codec: Codec,
    uri: String,
    gateway_url: String,
    reduced_strength: bool,
}

pub async fn cmd_cid(args: CidArgs, ctx: &CliContext) -> Result<()> {
    let payload = match (&args.text, &args.file) {
        (Some(text), _) => text.clone().into_bytes(),
        (None, Some(path)) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("pass --text or --file"),
    };

    let settings = &ctx.config().hash;
    let codec = args.codec.unwrap_or(settings.codec);
    let algorithm = args.algorithm.unwrap_or(settings.algorithm);
    let gateway = args.gateway.as_deref().unwrap_or(&settings.gateway);

    let identifier = ContentIdentifier::for_algorithm(algorithm);
    let digest = identifier.hash(&payload).await;
    let cid = ContentId::from_digest(&digest, codec);

    let outcome = CidOutcome {
        digest: digest.hex(),
        algorithm: digest.algorithm(),
        codec,
        uri: to_uri(&cid),
        gateway_url: to_gateway_url(&cid, gateway)?,
        reduced_strength: digest.reduced_strength(),
        cid: cid.to_string(),
    };
    if !emit_structured(ctx.output(), &outcome)? {
        println!("{}", outcome.cid);
        println!("uri: {}", outcome.uri);
        println!("gateway: {}", outcome.gateway_url);
        if outcome.reduced_strength {
            println!("note: reduced-strength digest");
        }
    }
    Ok(())
}
