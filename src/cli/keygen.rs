//! Keygen command - prints a fresh API key and its stored digest

use clap::Args;

use crate::infrastructure::api_key::ApiKeyGenerator;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Prefix prepended to the random part of the key
    #[arg(long, default_value = "isk_")]
    pub prefix: String,
}

pub fn run(args: KeygenArgs) -> anyhow::Result<()> {
    let generated = ApiKeyGenerator::new(args.prefix).generate();

    println!("key:    {}", generated.key);
    println!("sha256: {}", generated.hash);

    Ok(())
}
