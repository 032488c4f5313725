pub mod etherscan;
