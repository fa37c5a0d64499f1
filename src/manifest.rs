//! Manifest builder.
//!
//! Renders a validated, ledger-executable instruction sequence for each of
//! the closed set of operation templates: fund-request, add-liquidity,
//! unstake, and collect-fills. The builder is pure and deterministic given
//! its inputs; after rendering, every manifest passes a static validation
//! pass before it is returned. A validation failure is a builder defect and
//! surfaces as [`SpammerError::ManifestInvalid`], never a retry.

use crate::config::NetworkContext;
use crate::error::SpammerError;
use std::fmt;

/// Typed argument values accepted by manifest instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValue {
    Address(String),
    Decimal(String),
    Bool(bool),
    U8(u8),
    U64(u64),
    Bucket(String),
    Expression(&'static str),
    EnumDiscriminator(u8),
}

impl fmt::Display for ManifestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestValue::Address(a) => write!(f, "Address(\"{}\")", a),
            ManifestValue::Decimal(d) => write!(f, "Decimal(\"{}\")", d),
            ManifestValue::Bool(b) => write!(f, "{}", b),
            ManifestValue::U8(v) => write!(f, "{}u8", v),
            ManifestValue::U64(v) => write!(f, "{}u64", v),
            ManifestValue::Bucket(name) => write!(f, "Bucket(\"{}\")", name),
            ManifestValue::Expression(e) => write!(f, "Expression(\"{}\")", e),
            ManifestValue::EnumDiscriminator(d) => write!(f, "Enum<{}u8>()", d),
        }
    }
}

/// One ledger instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    CallMethod {
        address: String,
        method: String,
        args: Vec<ManifestValue>,
    },
    TakeAllFromWorktop {
        resource: String,
        bucket: String,
    },
}

/// An ordered, statically validated instruction sequence for one
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    instructions: Vec<Instruction>,
}

impl Manifest {
    /// Assemble a manifest from raw instructions, running static
    /// validation before returning it.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Result<Self, SpammerError> {
        let manifest = Self { instructions };
        validate(&manifest)?;
        Ok(manifest)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Render to manifest text for inclusion in a signed intent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            match instruction {
                Instruction::CallMethod {
                    address,
                    method,
                    args,
                } => {
                    out.push_str("CALL_METHOD\n");
                    out.push_str(&format!("    Address(\"{}\")\n", address));
                    out.push_str(&format!("    \"{}\"\n", method));
                    for arg in args {
                        out.push_str(&format!("    {}\n", arg));
                    }
                }
                Instruction::TakeAllFromWorktop { resource, bucket } => {
                    out.push_str("TAKE_ALL_FROM_WORKTOP\n");
                    out.push_str(&format!("    Address(\"{}\")\n", resource));
                    out.push_str(&format!("    Bucket(\"{}\")\n", bucket));
                }
            }
            out.push_str(";\n");
        }
        out
    }
}

/// Parameters for an add-liquidity transaction.
#[derive(Debug, Clone)]
pub struct AddLiquidityParams {
    pub account: String,
    /// Whole XRD supplied as liquidity.
    pub amount: u64,
    /// Discount in the contract's 5-decimal fixed point (1250 = 1.25%).
    pub discount_bps: u32,
    pub auto_unstake: bool,
    pub auto_refill: bool,
    pub refill_threshold: u64,
    pub automation_fee: u64,
}

/// Parameters for an unstake transaction driven through one validator.
#[derive(Debug, Clone)]
pub struct UnstakeParams {
    pub account: String,
    /// Whole XRD worth of stake units to unstake.
    pub amount: u64,
    pub validator: String,
    pub lsu_resource: String,
    pub max_iterations: u8,
}

/// Parameters for collecting fills against a held liquidity receipt.
#[derive(Debug, Clone)]
pub struct CollectFillsParams {
    pub account: String,
    pub fills_to_collect: u64,
}

/// The closed set of operation templates the builder knows how to render.
#[derive(Debug, Clone)]
pub enum ManifestTemplate {
    FundRequest { recipient: String },
    AddLiquidity(AddLiquidityParams),
    Unstake(UnstakeParams),
    CollectFills(CollectFillsParams),
}

impl ManifestTemplate {
    /// Short name used in logs and abort reports.
    pub fn name(&self) -> &'static str {
        match self {
            ManifestTemplate::FundRequest { .. } => "fund_request",
            ManifestTemplate::AddLiquidity(_) => "add_liquidity",
            ManifestTemplate::Unstake(_) => "unstake",
            ManifestTemplate::CollectFills(_) => "collect_fills",
        }
    }
}

/// Fee locked at the faucet for every transaction, in XRD.
const FEE_LOCK_AMOUNT: &str = "100";

/// Format a 5-decimal fixed-point value from its integer representation.
///
/// The contract expects discount and fee arguments as exact decimal
/// strings; amounts are kept as integers everywhere else so no floating
/// point ever reaches signed transaction content. `1250` renders as
/// `"0.01250"`.
pub fn format_fixed_point(units: u32) -> String {
    format!("0.{:05}", units)
}

/// Build and statically validate a manifest for one template.
pub fn build(template: &ManifestTemplate, net: &NetworkContext) -> Result<Manifest, SpammerError> {
    let instructions = match template {
        ManifestTemplate::FundRequest { recipient } => render_fund_request(recipient, net),
        ManifestTemplate::AddLiquidity(params) => render_add_liquidity(params, net),
        ManifestTemplate::Unstake(params) => render_unstake(params, net),
        ManifestTemplate::CollectFills(params) => render_collect_fills(params, net),
    };
    Manifest::from_instructions(instructions)
}

fn lock_fee(net: &NetworkContext) -> Instruction {
    Instruction::CallMethod {
        address: net.faucet_component.clone(),
        method: "lock_fee".to_string(),
        args: vec![ManifestValue::Decimal(FEE_LOCK_AMOUNT.to_string())],
    }
}

fn withdraw(account: &str, resource: &str, amount: u64) -> Instruction {
    Instruction::CallMethod {
        address: account.to_string(),
        method: "withdraw".to_string(),
        args: vec![
            ManifestValue::Address(resource.to_string()),
            ManifestValue::Decimal(amount.to_string()),
        ],
    }
}

fn deposit_batch(account: &str) -> Instruction {
    Instruction::CallMethod {
        address: account.to_string(),
        method: "deposit_batch".to_string(),
        args: vec![ManifestValue::Expression("ENTIRE_WORKTOP")],
    }
}

fn render_fund_request(recipient: &str, net: &NetworkContext) -> Vec<Instruction> {
    vec![
        lock_fee(net),
        Instruction::CallMethod {
            address: net.faucet_component.clone(),
            method: "free".to_string(),
            args: vec![],
        },
        Instruction::CallMethod {
            address: recipient.to_string(),
            method: "try_deposit_batch_or_abort".to_string(),
            args: vec![
                ManifestValue::Expression("ENTIRE_WORKTOP"),
                ManifestValue::EnumDiscriminator(0),
            ],
        },
    ]
}

fn render_add_liquidity(params: &AddLiquidityParams, net: &NetworkContext) -> Vec<Instruction> {
    vec![
        lock_fee(net),
        withdraw(&params.account, &net.xrd_resource, params.amount),
        Instruction::TakeAllFromWorktop {
            resource: net.xrd_resource.clone(),
            bucket: "xrd_bucket".to_string(),
        },
        Instruction::CallMethod {
            address: net.liquify_component.clone(),
            method: "add_liquidity".to_string(),
            args: vec![
                ManifestValue::Bucket("xrd_bucket".to_string()),
                ManifestValue::Decimal(format_fixed_point(params.discount_bps)),
                ManifestValue::Bool(params.auto_unstake),
                ManifestValue::Bool(params.auto_refill),
                ManifestValue::Decimal(params.refill_threshold.to_string()),
                ManifestValue::Decimal(params.automation_fee.to_string()),
            ],
        },
        Instruction::TakeAllFromWorktop {
            resource: net.liquidity_receipt.clone(),
            bucket: "receipt_bucket".to_string(),
        },
        Instruction::CallMethod {
            address: net.receipt_recipient.clone(),
            method: "try_deposit_or_abort".to_string(),
            args: vec![
                ManifestValue::Bucket("receipt_bucket".to_string()),
                ManifestValue::EnumDiscriminator(0),
            ],
        },
        deposit_batch(&params.account),
    ]
}

fn render_unstake(params: &UnstakeParams, net: &NetworkContext) -> Vec<Instruction> {
    vec![
        lock_fee(net),
        withdraw(&params.account, &net.xrd_resource, params.amount),
        Instruction::TakeAllFromWorktop {
            resource: net.xrd_resource.clone(),
            bucket: "xrd_bucket".to_string(),
        },
        Instruction::CallMethod {
            address: params.validator.clone(),
            method: "stake".to_string(),
            args: vec![ManifestValue::Bucket("xrd_bucket".to_string())],
        },
        Instruction::TakeAllFromWorktop {
            resource: params.lsu_resource.clone(),
            bucket: "lsu_bucket".to_string(),
        },
        Instruction::CallMethod {
            address: net.liquify_component.clone(),
            method: "liquify_unstake".to_string(),
            args: vec![
                ManifestValue::Bucket("lsu_bucket".to_string()),
                ManifestValue::U8(params.max_iterations),
            ],
        },
        deposit_batch(&params.account),
    ]
}

fn render_collect_fills(params: &CollectFillsParams, net: &NetworkContext) -> Vec<Instruction> {
    vec![
        lock_fee(net),
        withdraw(&params.account, &net.liquidity_receipt, 1),
        Instruction::TakeAllFromWorktop {
            resource: net.liquidity_receipt.clone(),
            bucket: "receipt_bucket".to_string(),
        },
        Instruction::CallMethod {
            address: net.liquify_component.clone(),
            method: "collect_fills".to_string(),
            args: vec![
                ManifestValue::Bucket("receipt_bucket".to_string()),
                ManifestValue::U64(params.fills_to_collect),
            ],
        },
        deposit_batch(&params.account),
    ]
}

const ADDRESS_PREFIXES: [&str; 4] = ["account_", "component_", "resource_", "validator_"];

fn check_address(address: &str) -> Result<(), SpammerError> {
    if ADDRESS_PREFIXES.iter().any(|p| address.starts_with(p)) {
        Ok(())
    } else {
        Err(SpammerError::ManifestInvalid {
            detail: format!("address '{}' has an unrecognized prefix", address),
        })
    }
}

fn check_decimal(value: &str) -> Result<(), SpammerError> {
    let well_formed = !value.is_empty()
        && value.chars().all(|c| c.is_ascii_digit() || c == '.')
        && value.chars().filter(|c| *c == '.').count() <= 1
        && value != ".";
    if well_formed {
        Ok(())
    } else {
        Err(SpammerError::ManifestInvalid {
            detail: format!("'{}' is not a well-formed decimal", value),
        })
    }
}

/// Static validation: reference and syntax well-formedness.
///
/// Checks that the fee lock comes first, every address carries a known
/// prefix, every decimal parses, and every bucket argument refers to a
/// bucket previously taken from the worktop and not yet consumed.
fn validate(manifest: &Manifest) -> Result<(), SpammerError> {
    let first_is_fee_lock = matches!(
        manifest.instructions.first(),
        Some(Instruction::CallMethod { method, .. }) if method == "lock_fee"
    );
    if !first_is_fee_lock {
        return Err(SpammerError::ManifestInvalid {
            detail: "first instruction must lock a fee".to_string(),
        });
    }

    let mut live_buckets: Vec<&str> = Vec::new();
    for instruction in &manifest.instructions {
        match instruction {
            Instruction::TakeAllFromWorktop { resource, bucket } => {
                check_address(resource)?;
                if live_buckets.contains(&bucket.as_str()) {
                    return Err(SpammerError::ManifestInvalid {
                        detail: format!("bucket '{}' declared twice", bucket),
                    });
                }
                live_buckets.push(bucket);
            }
            Instruction::CallMethod { address, args, .. } => {
                check_address(address)?;
                for arg in args {
                    match arg {
                        ManifestValue::Address(a) => check_address(a)?,
                        ManifestValue::Decimal(d) => check_decimal(d)?,
                        ManifestValue::Bucket(name) => {
                            let Some(pos) =
                                live_buckets.iter().position(|b| *b == name.as_str())
                            else {
                                return Err(SpammerError::ManifestInvalid {
                                    detail: format!(
                                        "bucket '{}' used before being taken from the worktop",
                                        name
                                    ),
                                });
                            };
                            // Buckets are consumed on use.
                            live_buckets.remove(pos);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}
