use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
mod input;
use keyward::{
    Argon2Hash, Argon2Params, AsymmetricEncryption, HashRecord, HashWithSalt, KeyStorage,
    Pbkdf2Hash, Prf, RsaEncryption, default_key_dir,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    #[value(name = "pbkdf2-sha512")]
    Pbkdf2Sha512,
    #[value(name = "pbkdf2-sha256")]
    Pbkdf2Sha256,
    #[value(name = "pbkdf2-sha1")]
    Pbkdf2Sha1,
    #[value(name = "argon2id")]
    Argon2id,
}

impl Algorithm {
    /// Work factors recommended by OWASP for each algorithm.
    fn default_iterations(self) -> u32 {
        match self {
            Algorithm::Pbkdf2Sha512 => 210_000,
            Algorithm::Pbkdf2Sha256 => 600_000,
            Algorithm::Pbkdf2Sha1 => 1_300_000,
            Algorithm::Argon2id => 3,
        }
    }
}

#[derive(Debug, clap::Args)]
struct HashArgs {
    /// Hash algorithm
    #[arg(long, value_enum, default_value_t = Algorithm::Pbkdf2Sha512)]
    algorithm: Algorithm,

    /// Argon2 memory cost in KiB (default: 65536)
    #[arg(long = "argon-mem")]
    mem_cost_kib: Option<u32>,

    /// Argon2 parallelism (default: 1)
    #[arg(long = "argon-parallelism")]
    parallelism: Option<u32>,
}

impl HashArgs {
    fn hasher(&self) -> Result<Box<dyn HashWithSalt>> {
        Ok(match self.algorithm {
            Algorithm::Pbkdf2Sha512 => Box::new(Pbkdf2Hash::with_prf(Prf::HmacSha512)),
            Algorithm::Pbkdf2Sha256 => Box::new(Pbkdf2Hash::with_prf(Prf::HmacSha256)),
            Algorithm::Pbkdf2Sha1 => Box::new(Pbkdf2Hash::with_prf(Prf::HmacSha1)),
            Algorithm::Argon2id => {
                let default = Argon2Params::default();
                let params = Argon2Params::new(
                    self.mem_cost_kib.unwrap_or(default.mem_cost_kib()),
                    self.parallelism.unwrap_or(default.parallelism()),
                )?;
                Box::new(Argon2Hash::new(params))
            }
        })
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyward")]
#[command(
    version,
    about = "Salted password hashing and RSA-OAEP encryption from the command line."
)]
struct Cli {
    /// Directory holding public.der and private.der
    #[arg(long, global = true, value_name = "DIR", env = "KEYWARD_KEY_DIR")]
    key_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints a fresh random salt as hex
    Salt {
        #[command(flatten)]
        hash: HashArgs,
    },

    /// Hashes a secret and prints the record as JSON
    Hash {
        #[command(flatten)]
        hash: HashArgs,

        /// Work factor; 0 returns the secret unchanged
        #[arg(long, env = "KEYWARD_ITERATIONS")]
        iterations: Option<u32>,

        /// Hex encoded salt instead of a generated one
        #[arg(long)]
        salt: Option<String>,
    },

    /// Checks a secret against a JSON hash record, using the algorithm and
    /// parameters stored in it
    #[command(arg_required_else_help = true)]
    Verify {
        /// File containing the record printed by `hash`
        #[arg(long)]
        record: PathBuf,
    },

    /// Generates an RSA key pair into the key directory
    Keygen {
        /// Key length in bits
        #[arg(long, default_value_t = keyward::asymmetric::rsa::KEY_LENGTH)]
        bits: usize,

        /// Replace an existing key pair
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Encrypts stdin and prints the ciphertext as hex
    Encrypt {
        /// Public key file (default: <key-dir>/public.der)
        #[arg(long, value_name = "PATH")]
        public_key: Option<PathBuf>,
    },

    /// Decrypts hex ciphertext from stdin and writes the plaintext to stdout
    Decrypt {
        /// Private key file (default: <key-dir>/private.der)
        #[arg(long, value_name = "PATH")]
        private_key: Option<PathBuf>,
    },
}

fn resolve_storage(dir: Option<PathBuf>) -> Result<KeyStorage> {
    match dir {
        Some(d) => Ok(KeyStorage::new(d)),
        None => Ok(KeyStorage::new(default_key_dir()?)),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    match args.command {
        Commands::Salt { hash } => {
            let hasher = hash.hasher()?;
            println!("{}", hex::encode(hasher.generate_salt()?));
        }
        Commands::Hash {
            hash,
            iterations,
            salt,
        } => {
            let hasher = hash.hasher()?;
            let iterations = iterations.unwrap_or(hash.algorithm.default_iterations());
            if iterations == 0 {
                eprintln!("warning: 0 iterations stores the secret unhashed");
            }

            let secret = input::read_secret(true)?;
            let record = match salt {
                Some(s) => {
                    let salt = hex::decode(s.trim()).context("salt is not valid hex")?;
                    HashRecord::with_salt(hasher.as_ref(), secret.as_bytes(), salt, iterations)?
                }
                None => HashRecord::create(hasher.as_ref(), secret.as_bytes(), iterations)?,
            };
            println!("{}", record.to_json()?);
        }
        Commands::Verify { record } => {
            let json = std::fs::read_to_string(&record)
                .with_context(|| format!("failed to read {}", record.display()))?;
            let record = HashRecord::from_json(&json)?;

            let secret = input::read_secret(false)?;
            if !record.verify(secret.as_bytes())? {
                bail!("mismatch");
            }
            println!("match");
        }
        Commands::Keygen { bits, force } => {
            let storage = resolve_storage(args.key_dir)?;
            if storage.exists() && !force {
                bail!(
                    "key pair already exists in {} (use --force to replace it)",
                    storage.dir().display()
                );
            }

            let pair = RsaEncryption::with_key_length(bits)?.create_random_keys()?;
            storage.save_key_pair(&pair, force)?;
            println!("key pair written to {}", storage.dir().display());
        }
        Commands::Encrypt { public_key } => {
            let key = match public_key {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => resolve_storage(args.key_dir)?.load_public()?,
            };

            let plaintext = input::read_stdin()?;
            let ciphertext = RsaEncryption::new().encrypt(&plaintext, &key)?;
            println!("{}", hex::encode(ciphertext));
        }
        Commands::Decrypt { private_key } => {
            let key = match private_key {
                Some(path) => zeroize::Zeroizing::new(
                    std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => resolve_storage(args.key_dir)?.load_private()?,
            };

            let input = input::read_stdin()?;
            let text = std::str::from_utf8(&input).context("ciphertext is not valid hex")?;
            let ciphertext = hex::decode(text.trim()).context("ciphertext is not valid hex")?;

            let plaintext = RsaEncryption::new().decrypt(&ciphertext, &key)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
