//! Identity registry CLI: `idreg` command.
//!
//! Manages signer accounts, local ledgers and registry deployments, and
//! drives the registry operations: identities, credentials, verification
//! requests and verifier authorization.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use identity_registry::client::{GasSettings, RegistryClient};
use identity_registry::config::{NetworkConfig, Networks, DEFAULT_NETWORK};
use identity_registry::deploy::{
    contract_url, deploy_registry, remediation_hint, LOW_BALANCE_THRESHOLD,
};
use identity_registry::storage::keystore::{self, key_path, validate_account_name};
use identity_registry::storage::{DeploymentStore, LedgerStore};
use identity_registry::time::micros_to_rfc3339;
use identity_registry::{
    format_ether, parse_ether, Address, ContentHash, Decision, IdentityRegistry, Ledger,
    LedgerError, RegistryError, Signer, TxReceipt,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("IDREG_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = std::env::var("HOME").context("HOME not set; pass --data-dir or set IDREG_HOME")?;
    Ok(PathBuf::from(home).join(".idreg"))
}

fn keystore_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("keystore")
}

fn deployments_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("deployments")
}

fn network_dir(data_dir: &Path, network: &str) -> PathBuf {
    data_dir.join("networks").join(network)
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var("IDREG_PASSPHRASE") {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Identity registry CLI: deploy a registry, manage identities and
/// credentials, and run verifier-gated verification.
#[derive(Parser, Debug)]
#[command(
    name = "idreg",
    about = "Identity registry CLI",
    version,
    long_about = "idreg: identity registry CLI\n\nDeploy an identity registry, register identities, attach credential\nhashes, and request or resolve their verification."
)]
struct Cli {
    /// Data directory (default: $IDREG_HOME or ~/.idreg)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Network to use
    #[arg(long, global = true, default_value = DEFAULT_NETWORK)]
    network: String,

    /// Account that signs transactions
    #[arg(long, global = true, default_value = "default")]
    account: String,

    /// Registry address (default: latest deployment on the network)
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Gas limit for transactions (default: network setting)
    #[arg(long, global = true)]
    gas_limit: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage signer accounts
    Account {
        #[command(subcommand)]
        subcommand: AccountCommands,
    },

    /// Manage the local ledger of a network
    Node {
        #[command(subcommand)]
        subcommand: NodeCommands,
    },

    /// Deploy a new identity registry
    Deploy,

    /// List the latest recorded deployment of every network
    Deployments,

    /// Create and inspect identities
    Identity {
        #[command(subcommand)]
        subcommand: IdentityCommands,
    },

    /// Attach and list credentials
    Credential {
        #[command(subcommand)]
        subcommand: CredentialCommands,
    },

    /// Request, resolve and inspect verifications
    Verification {
        #[command(subcommand)]
        subcommand: VerificationCommands,
    },

    /// Manage authorized verifiers (owner only)
    Verifier {
        #[command(subcommand)]
        subcommand: VerifierCommands,
    },

    /// Show the registry owner
    Owner,
}

#[derive(Subcommand, Debug)]
enum AccountCommands {
    /// Create a new account
    New {
        /// Account name (default: --account)
        name: Option<String>,
    },
    /// List accounts in the keystore
    List,
    /// Show an account's address and balance
    Show {
        /// Account name (default: --account)
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum NodeCommands {
    /// Create the network's ledger, funding keystore accounts
    Init {
        /// Replace an existing ledger
        #[arg(long)]
        force: bool,
    },
    /// Show chain height, contracts and account balances
    Status,
    /// Credit an account from the development faucet
    Fund {
        /// Address or account name
        target: String,
        /// Amount in ETH
        amount: String,
    },
}

#[derive(Subcommand, Debug)]
enum IdentityCommands {
    /// Register an identity for the signing account
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: String,
    },
    /// Show an identity
    Show {
        /// Address or account name (default: --account)
        subject: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialCommands {
    /// Attach (or replace) a credential hash
    Add {
        /// Credential type, e.g. "education"
        credential_type: String,
        #[command(flatten)]
        hash: HashArgs,
    },
    /// List a subject's credentials
    List {
        /// Address or account name (default: --account)
        subject: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum VerificationCommands {
    /// Request verification of a credential
    Request {
        credential_type: String,
        #[command(flatten)]
        hash: HashArgs,
    },
    /// Approve or reject a pending request (authorized verifiers)
    Resolve {
        /// Subject address or account name
        subject: String,
        credential_type: String,
        /// approve | reject
        decision: String,
    },
    /// Show the latest request for a credential
    Show {
        subject: String,
        credential_type: String,
        /// Include earlier requests
        #[arg(long)]
        history: bool,
    },
    /// List all pending requests
    Pending,
}

#[derive(Subcommand, Debug)]
enum VerifierCommands {
    /// Authorize (or with --revoke, deauthorize) a verifier
    Set {
        /// Address or account name
        verifier: String,
        #[arg(long)]
        revoke: bool,
    },
    /// Check whether an address is an authorized verifier
    Check { verifier: String },
    /// List authorized verifiers
    List,
}

/// A credential hash given directly or computed from a document.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct HashArgs {
    /// 32-byte hash as 0x-prefixed hex
    #[arg(long)]
    hash: Option<String>,
    /// Hash the contents of this file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Hash this text
    #[arg(long)]
    text: Option<String>,
}

impl HashArgs {
    fn resolve(&self) -> Result<ContentHash> {
        if let Some(hash) = &self.hash {
            return hash
                .parse()
                .with_context(|| format!("invalid credential hash '{hash}'"));
        }
        if let Some(path) = &self.file {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            return Ok(ContentHash::of(&bytes));
        }
        if let Some(text) = &self.text {
            return Ok(ContentHash::of(text.as_bytes()));
        }
        bail!("one of --hash, --file or --text is required")
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Resolved global options plus the loaded ledger.
struct Session {
    data_dir: PathBuf,
    network: NetworkConfig,
    account: String,
    contract: Option<String>,
    gas_limit: Option<u64>,
    verbose: bool,
}

impl Session {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        let networks = Networks::load(&data_dir).context("failed to load network settings")?;
        let network = networks.get(&cli.network)?.clone();
        Ok(Self {
            data_dir,
            network,
            account: cli.account.clone(),
            contract: cli.contract.clone(),
            gas_limit: cli.gas_limit,
            verbose: cli.verbose,
        })
    }

    fn ledger_store(&self) -> LedgerStore {
        LedgerStore::new(network_dir(&self.data_dir, &self.network.name))
    }

    fn keystore(&self) -> PathBuf {
        keystore_dir(&self.data_dir)
    }

    fn gas(&self) -> GasSettings {
        GasSettings::for_network(&self.network).with_gas_limit(self.gas_limit)
    }

    /// Ephemeral networks start from genesis; others load their snapshot.
    fn open_ledger(&self) -> Result<Ledger> {
        if self.network.ephemeral {
            let accounts: Vec<Address> = keystore::list_accounts(&self.keystore())?
                .into_iter()
                .map(|a| a.address)
                .collect();
            log::debug!("starting ephemeral {} ledger", self.network.name);
            return Ok(Ledger::genesis(&self.network, &accounts));
        }
        Ok(self.ledger_store().load()?)
    }

    fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        if self.network.ephemeral {
            return Ok(());
        }
        self.ledger_store()
            .save(ledger)
            .context("failed to save ledger")
    }

    fn load_signer(&self, name: &str) -> Result<Signer> {
        validate_account_name(name)?;
        let path = key_path(&self.keystore(), name);
        if !path.exists() {
            bail!(
                "account '{name}' not found (create it with `idreg account new {name}`)"
            );
        }
        let passphrase = read_passphrase(&format!("Passphrase for '{name}': "))?;
        keystore::load_signer(&path, &passphrase)
            .with_context(|| format!("failed to unlock account '{name}'"))
    }

    /// Parse an address, or look up an account name in the keystore.
    fn resolve_address(&self, value: &str) -> Result<Address> {
        if value.starts_with("0x") {
            return value
                .parse()
                .with_context(|| format!("invalid address '{value}'"));
        }
        validate_account_name(value)
            .with_context(|| format!("'{value}' is neither an address nor an account name"))?;
        let path = key_path(&self.keystore(), value);
        if !path.exists() {
            bail!("'{value}' is neither an address nor a known account");
        }
        Ok(keystore::read_public_info(&path)?.address)
    }

    /// `--contract`, or the latest deployment on this network.
    fn contract(&self) -> Result<Address> {
        if let Some(contract) = &self.contract {
            return self.resolve_address(contract);
        }
        let store = DeploymentStore::new(deployments_dir(&self.data_dir))?;
        match store.load_latest(&self.network.name)? {
            Some(info) => Ok(info.contract_address),
            None => bail!(
                "no registry deployed on {} (run `idreg deploy` or pass --contract)",
                self.network.name
            ),
        }
    }

    fn registry<'l>(&self, ledger: &'l Ledger) -> Result<&'l IdentityRegistry> {
        let contract = self.contract()?;
        ledger
            .registry(&contract)
            .with_context(|| format!("no registry at {contract} on {}", self.network.name))
    }

    /// Sign and submit one registry call as `--account`, saving the ledger
    /// on success.
    fn transact<F>(&self, op: F) -> Result<TxReceipt>
    where
        F: FnOnce(&mut RegistryClient<'_>) -> identity_registry::Result<TxReceipt>,
    {
        let mut ledger = self.open_ledger()?;
        let contract = self.contract()?;
        let signer = self.load_signer(&self.account)?;
        let receipt = {
            let mut client = RegistryClient::new(&mut ledger, &signer, contract, self.gas());
            op(&mut client)?
        };
        self.save_ledger(&ledger)?;
        if self.verbose {
            print_receipt(&receipt);
        }
        Ok(receipt)
    }
}

fn print_receipt(receipt: &TxReceipt) {
    println!("  Tx:     {}", receipt.tx_hash);
    println!("  Block:  {}", receipt.block_number);
    println!("  Gas:    {}", receipt.gas_used);
    println!("  Fee:    {} ETH", format_ether(receipt.fee));
    for event in &receipt.events {
        println!("  Event:  {event}");
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = Session::from_cli(&cli).and_then(|session| run(&session, cli.command));

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(s: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Account { subcommand } => match subcommand {
            AccountCommands::New { name } => cmd_account_new(s, name.as_deref()),
            AccountCommands::List => cmd_account_list(s),
            AccountCommands::Show { name } => cmd_account_show(s, name.as_deref()),
        },
        Commands::Node { subcommand } => match subcommand {
            NodeCommands::Init { force } => cmd_node_init(s, force),
            NodeCommands::Status => cmd_node_status(s),
            NodeCommands::Fund { target, amount } => cmd_node_fund(s, &target, &amount),
        },
        Commands::Deploy => cmd_deploy(s),
        Commands::Deployments => cmd_deployments(s),
        Commands::Identity { subcommand } => match subcommand {
            IdentityCommands::Create { name, contact } => cmd_identity_create(s, &name, &contact),
            IdentityCommands::Show { subject } => cmd_identity_show(s, subject.as_deref()),
        },
        Commands::Credential { subcommand } => match subcommand {
            CredentialCommands::Add {
                credential_type,
                hash,
            } => cmd_credential_add(s, &credential_type, &hash),
            CredentialCommands::List { subject } => cmd_credential_list(s, subject.as_deref()),
        },
        Commands::Verification { subcommand } => match subcommand {
            VerificationCommands::Request {
                credential_type,
                hash,
            } => cmd_verification_request(s, &credential_type, &hash),
            VerificationCommands::Resolve {
                subject,
                credential_type,
                decision,
            } => cmd_verification_resolve(s, &subject, &credential_type, &decision),
            VerificationCommands::Show {
                subject,
                credential_type,
                history,
            } => cmd_verification_show(s, &subject, &credential_type, history),
            VerificationCommands::Pending => cmd_verification_pending(s),
        },
        Commands::Verifier { subcommand } => match subcommand {
            VerifierCommands::Set { verifier, revoke } => cmd_verifier_set(s, &verifier, !revoke),
            VerifierCommands::Check { verifier } => cmd_verifier_check(s, &verifier),
            VerifierCommands::List => cmd_verifier_list(s),
        },
        Commands::Owner => cmd_owner(s),
    }
}

// ── Accounts ──────────────────────────────────────────────────────────────────

/// `idreg account new [NAME]`
fn cmd_account_new(s: &Session, name: Option<&str>) -> Result<()> {
    let name = name.unwrap_or(s.account.as_str());
    validate_account_name(name)?;

    let path = key_path(&s.keystore(), name);
    if path.exists() {
        bail!("account '{name}' already exists at {}", path.display());
    }

    let passphrase = read_passphrase(&format!("Passphrase for new account '{name}': "))?;
    if passphrase.is_empty() {
        bail!("passphrase cannot be empty");
    }
    if std::env::var("IDREG_PASSPHRASE").is_err() {
        let confirm = read_passphrase("Confirm passphrase: ")?;
        if passphrase != confirm {
            bail!("passphrases do not match");
        }
    }

    let signer = Signer::generate(name);
    keystore::save_signer(&signer, &path, &passphrase).context("failed to save account")?;

    println!("Created account '{name}'");
    println!("  Address: {}", signer.address());
    println!("  File:    {}", path.display());
    if s.verbose {
        println!("  Key:     {}", signer.public_key_base64());
    }
    Ok(())
}

/// `idreg account list`
fn cmd_account_list(s: &Session) -> Result<()> {
    let accounts = keystore::list_accounts(&s.keystore())?;
    if accounts.is_empty() {
        println!("No accounts. Create one with `idreg account new`.");
        return Ok(());
    }
    for account in accounts {
        println!("{:<20} {}", account.name, account.address);
    }
    Ok(())
}

/// `idreg account show [NAME]`
fn cmd_account_show(s: &Session, name: Option<&str>) -> Result<()> {
    let name = name.unwrap_or(s.account.as_str());
    validate_account_name(name)?;
    let path = key_path(&s.keystore(), name);
    if !path.exists() {
        bail!("account '{name}' not found (expected at {})", path.display());
    }
    let info = keystore::read_public_info(&path)?;

    println!("Account: {}", info.name);
    println!("  Address:    {}", info.address);
    println!("  Public Key: {}", info.public_key);
    println!("  Created:    {}", micros_to_rfc3339(info.created_at));

    match s.open_ledger() {
        Ok(ledger) => {
            let account = ledger.account(&info.address);
            println!(
                "  Balance:    {} ETH ({})",
                format_ether(account.balance),
                s.network.name
            );
            println!("  Nonce:      {}", account.nonce);
        }
        Err(e) => log::debug!("balance unavailable: {e}"),
    }
    Ok(())
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// `idreg node init [--force]`
fn cmd_node_init(s: &Session, force: bool) -> Result<()> {
    if s.network.ephemeral {
        bail!(
            "{} is ephemeral and starts fresh on every command; use --network localhost",
            s.network.name
        );
    }
    let store = s.ledger_store();
    if store.exists() && !force {
        bail!(
            "ledger for {} already exists at {} (use --force to replace it)",
            s.network.name,
            store.path().display()
        );
    }

    let accounts = keystore::list_accounts(&s.keystore())?;
    let addresses: Vec<Address> = accounts.iter().map(|a| a.address).collect();
    let ledger = Ledger::genesis(&s.network, &addresses);
    store.save(&ledger).context("failed to save ledger")?;

    println!(
        "Initialized {} (chain id {})",
        s.network.name, s.network.chain_id
    );
    for account in &accounts {
        let balance = ledger.balance(&account.address);
        if balance > 0 {
            println!(
                "  {:<20} {} {} ETH",
                account.name,
                account.address,
                format_ether(balance)
            );
        }
    }
    Ok(())
}

/// `idreg node status`
fn cmd_node_status(s: &Session) -> Result<()> {
    let ledger = s.open_ledger()?;

    println!("Network:  {}", s.network.name);
    println!("Chain ID: {}", ledger.chain_id());
    println!("Height:   {}", ledger.height());
    println!("Gas:      {} wei/gas", s.network.gas_price);

    let contracts = ledger.contracts();
    println!("Registries: {}", contracts.len());
    for contract in contracts {
        let registry = ledger.registry(&contract)?;
        let stats = registry.stats();
        println!(
            "  {contract}  owner {}  {} identities, {} credentials, {} pending",
            registry.contract_owner().short(),
            stats.identities,
            stats.credentials,
            stats.pending_requests
        );
    }

    if s.verbose {
        println!("Accounts:");
        for account in keystore::list_accounts(&s.keystore())? {
            let state = ledger.account(&account.address);
            println!(
                "  {:<20} {} ETH  nonce {}",
                account.name,
                format_ether(state.balance),
                state.nonce
            );
        }
    }
    Ok(())
}

/// `idreg node fund <TARGET> <AMOUNT>`
fn cmd_node_fund(s: &Session, target: &str, amount: &str) -> Result<()> {
    if s.network.initial_balance.is_none() {
        bail!(
            "{} has no development faucet; get test tokens from the network's faucet",
            s.network.name
        );
    }
    if s.network.ephemeral {
        bail!("{} is ephemeral; funds would not persist", s.network.name);
    }

    let address = s.resolve_address(target)?;
    let wei = parse_ether(amount).with_context(|| format!("invalid amount '{amount}'"))?;

    let mut ledger = s.open_ledger()?;
    ledger.fund(address, wei);
    s.save_ledger(&ledger)?;

    println!(
        "Funded {address} with {} ETH (balance {} ETH)",
        format_ether(wei),
        format_ether(ledger.balance(&address))
    );
    Ok(())
}

// ── Deploy ────────────────────────────────────────────────────────────────────

/// `idreg deploy`
fn cmd_deploy(s: &Session) -> Result<()> {
    let deployer = s.load_signer(&s.account)?;
    let mut ledger = s.open_ledger()?;

    let balance = ledger.balance(&deployer.address());
    println!("Deploying identity registry to {}...", s.network.name);
    println!("  Deployer: {}", deployer.address());
    println!("  Balance:  {} ETH", format_ether(balance));
    if balance < LOW_BALANCE_THRESHOLD {
        eprintln!("warning: low balance; make sure the deployer has enough ETH for deployment");
    }

    let outcome = match deploy_registry(&mut ledger, &s.network, &deployer, &s.gas()) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(hint) = remediation_hint(&e) {
                eprintln!("hint: {hint}");
            }
            return Err(anyhow!(e).context("deployment failed"));
        }
    };
    s.save_ledger(&ledger)?;
    let store = DeploymentStore::new(deployments_dir(&s.data_dir))?;
    store
        .save(&outcome.info)
        .context("failed to save deployment record")?;

    println!("Registry deployed");
    println!("  Contract: {}", outcome.contract_address);
    println!("  Network:  {}", s.network.name);
    println!("  Tx:       {}", outcome.receipt.tx_hash);
    println!("  Block:    {}", outcome.receipt.block_number);
    println!("  Gas used: {}", outcome.receipt.gas_used);
    println!("  Owner:    {}", outcome.contract_owner);
    println!(
        "  Deployer is authorized verifier: {}",
        outcome.deployer_is_verifier
    );
    if let Some(url) = contract_url(&s.network, &outcome.contract_address) {
        println!("  Explorer: {url}");
    }

    if s.verbose {
        println!();
        println!("Deployment summary:");
        println!("{}", serde_json::to_string_pretty(&outcome.info)?);
        println!();
        println!("Next steps:");
        println!("  idreg identity create --name \"John Doe\" --contact john@example.com");
        println!("  idreg credential add education --file diploma.pdf");
        println!("  idreg verification request education --file diploma.pdf");
    }
    if s.network.ephemeral {
        eprintln!(
            "note: {} is ephemeral; this deployment is discarded when the command exits",
            s.network.name
        );
    }
    Ok(())
}

/// `idreg deployments`
fn cmd_deployments(s: &Session) -> Result<()> {
    let store = DeploymentStore::new(deployments_dir(&s.data_dir))?;
    let deployments = store.list()?;
    if deployments.is_empty() {
        println!("No deployments recorded");
        return Ok(());
    }
    for info in deployments {
        println!(
            "{:<16} {}  block {}  {}",
            info.network, info.contract_address, info.block_number, info.timestamp
        );
    }
    Ok(())
}

// ── Identities ────────────────────────────────────────────────────────────────

/// `idreg identity create --name N --contact C`
fn cmd_identity_create(s: &Session, name: &str, contact: &str) -> Result<()> {
    let receipt = s.transact(|c| c.create_identity(name, contact))?;
    println!(
        "Created identity '{name}' for {} (block {})",
        receipt.from, receipt.block_number
    );
    Ok(())
}

/// `idreg identity show [SUBJECT]`
fn cmd_identity_show(s: &Session, subject: Option<&str>) -> Result<()> {
    let subject = s.resolve_address(subject.unwrap_or(s.account.as_str()))?;
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;

    let identity = registry
        .identity(&subject)
        .ok_or_else(|| anyhow!(LedgerError::from(RegistryError::NotRegistered(subject))))?;

    println!("Identity: {}", identity.owner);
    println!("  Name:     {}", identity.name);
    println!("  Contact:  {}", identity.contact);
    println!(
        "  Created:  {} (block {})",
        micros_to_rfc3339(identity.created_at),
        identity.created_block
    );
    println!("  Credentials: {}", registry.credentials(&subject).len());
    Ok(())
}

// ── Credentials ───────────────────────────────────────────────────────────────

/// `idreg credential add TYPE --hash H | --file F | --text T`
fn cmd_credential_add(s: &Session, credential_type: &str, hash: &HashArgs) -> Result<()> {
    let hash = hash.resolve()?;
    let receipt = s.transact(|c| c.add_credential(credential_type, hash))?;
    println!("Added credential '{credential_type}' for {}", receipt.from);
    println!("  Hash: {hash}");
    Ok(())
}

/// `idreg credential list [SUBJECT]`
fn cmd_credential_list(s: &Session, subject: Option<&str>) -> Result<()> {
    let subject = s.resolve_address(subject.unwrap_or(s.account.as_str()))?;
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;

    let credentials = registry.credentials(&subject);
    if credentials.is_empty() {
        println!("No credentials for {subject}");
        return Ok(());
    }
    for credential in credentials {
        let verified = registry.is_credential_verified(&subject, &credential.credential_type);
        println!(
            "{:<16} {}  verified: {}",
            credential.credential_type,
            credential.hash,
            yes_no(verified)
        );
    }
    Ok(())
}

// ── Verification ──────────────────────────────────────────────────────────────

/// `idreg verification request TYPE --hash H | --file F | --text T`
fn cmd_verification_request(s: &Session, credential_type: &str, hash: &HashArgs) -> Result<()> {
    let hash = hash.resolve()?;
    let receipt = s.transact(|c| c.request_verification(credential_type, hash))?;
    println!(
        "Requested verification of '{credential_type}' for {}",
        receipt.from
    );
    Ok(())
}

/// `idreg verification resolve SUBJECT TYPE approve|reject`
fn cmd_verification_resolve(
    s: &Session,
    subject: &str,
    credential_type: &str,
    decision: &str,
) -> Result<()> {
    let subject = s.resolve_address(subject)?;
    let decision: Decision = decision.parse()?;
    s.transact(|c| c.resolve_verification(subject, credential_type, decision))?;
    println!(
        "Verification of '{credential_type}' for {subject}: {}",
        decision.status().as_str()
    );
    Ok(())
}

/// `idreg verification show SUBJECT TYPE [--history]`
fn cmd_verification_show(
    s: &Session,
    subject: &str,
    credential_type: &str,
    history: bool,
) -> Result<()> {
    let subject = s.resolve_address(subject)?;
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;

    let requests = registry.verification_history(&subject, credential_type);
    let shown = if history {
        requests
    } else {
        &requests[requests.len().saturating_sub(1)..]
    };
    if shown.is_empty() {
        bail!(LedgerError::from(RegistryError::NotFound(format!(
            "no verification request for ({subject}, {credential_type})"
        ))));
    }

    for request in shown {
        println!("Request {}", request.id);
        println!("  Subject: {}", request.subject);
        println!("  Type:    {}", request.credential_type);
        println!("  Hash:    {}", request.hash);
        println!("  Status:  {}", request.status.as_str());
        println!("  Requested: {}", micros_to_rfc3339(request.requested_at));
        if let (Some(by), Some(at)) = (request.resolved_by, request.resolved_at) {
            println!("  Resolved:  {} by {by}", micros_to_rfc3339(at));
        }
    }
    Ok(())
}

/// `idreg verification pending`
fn cmd_verification_pending(s: &Session) -> Result<()> {
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;

    let pending = registry.pending_verifications();
    if pending.is_empty() {
        println!("No pending requests");
        return Ok(());
    }
    for request in pending {
        println!(
            "{:<6} {} {:<16} {}",
            request.id.to_string(),
            request.subject,
            request.credential_type,
            request.hash
        );
    }
    Ok(())
}

// ── Verifiers & owner ─────────────────────────────────────────────────────────

/// `idreg verifier set VERIFIER [--revoke]`
fn cmd_verifier_set(s: &Session, verifier: &str, enabled: bool) -> Result<()> {
    let verifier = s.resolve_address(verifier)?;
    s.transact(|c| c.set_authorized_verifier(verifier, enabled))?;
    if enabled {
        println!("Authorized verifier {verifier}");
    } else {
        println!("Revoked verifier {verifier}");
    }
    Ok(())
}

/// `idreg verifier check VERIFIER`
fn cmd_verifier_check(s: &Session, verifier: &str) -> Result<()> {
    let verifier = s.resolve_address(verifier)?;
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;
    println!("{}", registry.is_authorized_verifier(&verifier));
    Ok(())
}

/// `idreg verifier list`
fn cmd_verifier_list(s: &Session) -> Result<()> {
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;
    let verifiers = registry.authorized_verifiers();
    if verifiers.is_empty() {
        println!("No authorized verifiers");
    }
    for verifier in verifiers {
        println!("{verifier}");
    }
    Ok(())
}

/// `idreg owner`
fn cmd_owner(s: &Session) -> Result<()> {
    let ledger = s.open_ledger()?;
    let registry = s.registry(&ledger)?;
    println!("{}", registry.contract_owner());
    if s.verbose {
        println!(
            "  Deployed: {} (block {})",
            micros_to_rfc3339(registry.deployed_at()),
            registry.deployed_block()
        );
    }
    Ok(())
}
