use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use factuur_app_lib::sepa::epc_payload::FIELD_COUNT;
use factuur_app_lib::{
    encode_payment_payload, format_money, format_structured_reference, init_tracing,
    validate_structured_reference, wrap_structured_reference, AmountPolicy, Bill, PaymentPayload,
    PaymentPayloadInput, QrSettings,
};

#[derive(Parser, Debug)]
#[command(name = "qr-generator")]
struct Cli {
    /// JSON settings file (amountPolicy, defaultBic, ...)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Overrides the amount policy from settings and environment
    #[arg(long, value_enum, global = true)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a payload from flags
    Payload {
        #[arg(long)]
        iban: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "")]
        message: String,

        /// Treat the message as a structured reference (+++ wrapped)
        #[arg(long)]
        structured: bool,

        #[arg(long)]
        bic: Option<String>,
    },

    /// Build a payload from a JSON input document ("-" for stdin)
    PayloadJson { input: String },

    /// Print totals, payload and PDF file name for a bill JSON document
    Bill { input: String },

    /// Structured reference helpers
    Reference {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Parse a payload ("-" for stdin) and print its fields as JSON
    Inspect { input: String },
}

#[derive(Subcommand, Debug)]
enum ReferenceAction {
    Validate { value: String },

    Format {
        value: String,

        #[arg(long)]
        wrap: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    AllowZero,
    StrictlyPositive,
}

impl From<PolicyArg> for AmountPolicy {
    fn from(v: PolicyArg) -> Self {
        match v {
            PolicyArg::AllowZero => AmountPolicy::AllowZero,
            PolicyArg::StrictlyPositive => AmountPolicy::StrictlyPositive,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = QrSettings::load(cli.settings.as_deref()).map_err(|e| anyhow::anyhow!(e))?;
    let policy = cli.policy.map(AmountPolicy::from).unwrap_or(settings.amount_policy);
    tracing::debug!(policy = policy.as_str(), "resolved amount policy");

    match cli.command {
        Command::Payload {
            iban,
            name,
            amount,
            message,
            structured,
            bic,
        } => {
            let mut input = PaymentPayloadInput::new(iban, name, amount, message);
            input.structured = structured;
            input.bic = bic;
            println!("{}", encode(&settings, input, policy)?);
        }

        Command::PayloadJson { input } => {
            let raw = read_input(&input)?;
            let parsed: PaymentPayloadInput = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid payload input json: {e}"))?;
            println!("{}", encode(&settings, parsed, policy)?);
        }

        Command::Bill { input } => {
            let raw = read_input(&input)?;
            let bill: Bill = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid bill json: {e}"))?;

            let totals = bill.totals();
            println!("Subtotaal\t{}", format_money(totals.excl_vat));
            println!("BTW\t\t{}", format_money(totals.vat));
            println!("Totaal\t\t{}", format_money(totals.incl_vat));
            println!();
            println!("{}", encode(&settings, bill.payment_input(), policy)?);
            println!();
            println!("{}", bill.pdf_file_name());
        }

        Command::Reference { action } => match action {
            ReferenceAction::Validate { value } => {
                if let Err(reason) = validate_structured_reference(&value) {
                    anyhow::bail!("invalid structured reference: {reason}");
                }
                println!("ok");
            }
            ReferenceAction::Format { value, wrap } => {
                if wrap {
                    println!("{}", wrap_structured_reference(&value));
                } else {
                    println!("{}", format_structured_reference(&value));
                }
            }
        },

        Command::Inspect { input } => {
            let raw = read_input(&input)?;
            // `payload` output adds one newline after the (empty) last field.
            let payload = match raw.strip_suffix('\n') {
                Some(trimmed) if raw.split('\n').count() > FIELD_COUNT => trimmed,
                _ => raw.as_str(),
            };
            let parsed = PaymentPayload::parse(payload)
                .map_err(|e| anyhow::anyhow!("invalid payload: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }

    Ok(())
}

fn encode(
    settings: &QrSettings,
    input: PaymentPayloadInput,
    policy: AmountPolicy,
) -> anyhow::Result<String> {
    let input = settings.apply_defaults(input);
    encode_payment_payload(&input, policy)
        .map_err(|e| anyhow::anyhow!("cannot build payment payload: {e}"))
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(Path::new(source))
        .map_err(|e| anyhow::anyhow!("failed to read {source}: {e}"))
}
