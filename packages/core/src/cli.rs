use clap::Parser;

/// Gas Fee Forecaster CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "gas-fee-forecaster",
    version,
    about = "Short-horizon Ethereum gas price forecasts with confidence"
)]
pub struct Cli {
    /// HTTP listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// Etherscan API base URL
    #[arg(long)]
    pub etherscan_url: Option<String>,

    /// Model artifact path
    #[arg(long)]
    pub model_path: Option<String>,

    /// Background sampling interval in seconds
    #[arg(long)]
    pub sample_interval: Option<u64>,
}
