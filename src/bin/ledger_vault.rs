//! Vault CLI Tool
//!
//! Generates RSA signing keys and seals or opens key blobs for the
//! entropy ledger's key rotation watcher.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use entropy_ledger::crypto::{KeyVault, PassphraseVault, SigningIdentity, DEFAULT_KDF_ITERATIONS};

#[derive(Parser)]
#[command(name = "ledger-vault")]
#[command(about = "Entropy ledger key vault tool")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault passphrase
    #[arg(long, env = "LEDGER_VAULT_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Vault KDF salt
    #[arg(long, env = "LEDGER_VAULT_SALT", default_value = "")]
    salt: String,

    /// PBKDF2 iterations
    #[arg(long, default_value_t = DEFAULT_KDF_ITERATIONS)]
    iterations: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair as PKCS#8 / SPKI PEM files
    Keygen {
        /// Modulus size in bits
        #[arg(short, long, default_value_t = 2048)]
        bits: usize,

        /// Output path for the private key
        #[arg(short, long)]
        private_out: PathBuf,

        /// Output path for the public key
        #[arg(short = 'u', long)]
        public_out: PathBuf,
    },

    /// Encrypt a file into a vault blob
    Seal {
        /// Plaintext input file
        #[arg(short, long)]
        input: PathBuf,

        /// Blob output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt a vault blob and print the plaintext
    Open {
        /// Blob input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen {
            bits,
            private_out,
            public_out,
        } => {
            let identity = SigningIdentity::generate(bits)?;
            fs::write(&private_out, identity.private_key_pem()?)
                .with_context(|| format!("writing {:?}", private_out))?;
            fs::write(&public_out, identity.public_key_pem())
                .with_context(|| format!("writing {:?}", public_out))?;
            println!("Generated {}-bit RSA key pair", bits);
            println!("  private: {}", private_out.display());
            println!("  public:  {}", public_out.display());
        }
        Commands::Seal { input, output } => {
            let vault = open_vault(cli.passphrase.as_deref(), &cli.salt, cli.iterations)?;
            let plaintext = fs::read(&input).with_context(|| format!("reading {:?}", input))?;
            let blob = vault.seal(&plaintext)?;
            fs::write(&output, blob).with_context(|| format!("writing {:?}", output))?;
            println!("Sealed {} -> {}", input.display(), output.display());
        }
        Commands::Open { input } => {
            let vault = open_vault(cli.passphrase.as_deref(), &cli.salt, cli.iterations)?;
            let blob = fs::read(&input).with_context(|| format!("reading {:?}", input))?;
            println!("{}", vault.decrypt(&blob)?);
        }
    }

    Ok(())
}

fn open_vault(passphrase: Option<&str>, salt: &str, iterations: u32) -> Result<PassphraseVault> {
    let passphrase = passphrase
        .ok_or_else(|| anyhow!("A passphrase is required (--passphrase or LEDGER_VAULT_PASSPHRASE)"))?;
    Ok(PassphraseVault::new(passphrase.as_bytes(), salt.as_bytes(), iterations)?)
}
