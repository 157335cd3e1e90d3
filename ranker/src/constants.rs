//! Central repository for timeouts, intervals, paths and well-known values
//!
//! Constants are grouped by the component that consumes them. Anything an
//! operator may want to tune has a matching field in `config::Config` whose
//! default comes from the `defaults` module below.

/// Probe constants
pub mod probes {
    /// Height recorded by probes that can only measure reachability
    pub const LATENCY_ONLY_HEIGHT: i64 = 0;

    /// Sentinel for "probe failed" in both height and latency
    pub const SENTINEL: i64 = -1;

    /// Marker embedded in the JSON-RPC error payload when tx indexing is off
    pub const INDEXING_DISABLED_MARKER: &str = "transaction indexing is disabled";

    /// Syntactically valid transaction hash that never exists on chain
    pub const UNKNOWN_TX_HASH: &str =
        "0x0000000000000000000000000000000000000000000000000000000000000000";
}

/// Request paths appended to endpoint base URLs
pub mod paths {
    /// Cosmos REST latest block (height-reporting variant)
    pub const REST_LATEST_BLOCK: &str = "/cosmos/base/tendermint/v1beta1/blocks/latest";

    /// Cosmos REST auth params (latency-only variant)
    pub const REST_AUTH_PARAMS: &str = "/cosmos/auth/v1beta1/params";

    /// Tendermint RPC node status
    pub const JRPC_STATUS: &str = "/status";

    /// Tendermint RPC transaction lookup
    pub const JRPC_TX: &str = "/tx";
}

/// Publication constants
pub mod ranking {
    /// Number of ranked slots published per (chain, protocol)
    pub const PUBLISHED_SLOTS: usize = 3;

    /// Reserved slot for the Web3 safety-net URL
    pub const FALLBACK_RANK: u8 = 0;
}

/// Store key constants
pub mod store {
    /// Key suffix of the cached chain configuration
    pub const CHAIN_CONFIG_KEY: &str = "git-network-config-directory";

    /// Key prefix used when running in production
    pub const PRODUCTION_PREFIX: &str = "prod-";
}

/// Default configuration values
pub mod defaults {
    /// Seconds slept between successful cycles
    pub const CYCLE_INTERVAL_SECONDS: u64 = 5;

    /// Consecutive configuration failures tolerated before backing off
    pub const CONFIG_FAILURE_THRESHOLD: u32 = 5;

    /// Back-off applied once the failure threshold is exceeded
    pub const CONFIG_FAILURE_BACKOFF_SECONDS: u64 = 5;

    /// Probe timeout in seconds
    pub const PROBE_TIMEOUT_SECONDS: u64 = 1;

    /// Transaction-indexing precondition timeout in seconds
    pub const TX_INDEX_CHECK_TIMEOUT_SECONDS: u64 = 5;

    /// Chains whose REST API lacks the tendermint latest-block route
    pub const LATENCY_ONLY_REST_CHAINS: &[&str] = &["GRAVITYBRIDGE"];

    /// Rank-0 Web3 safety net
    pub const WEB3_FALLBACK_URL: &str = "https://evmos-evm.publicnode.com";

    /// SQLite database location
    pub const DATABASE_PATH: &str = "data/ranker.db";

    /// Chain registry repository on GitHub
    pub const REGISTRY_REPOSITORY: &str = "evmos/chain-token-registry";

    /// GitHub REST API base URL
    pub const REGISTRY_API_BASE_URL: &str = "https://api.github.com";

    /// Path fragment selecting chain configuration files in the registry tree
    pub const REGISTRY_CHAIN_CONFIG_PATH: &str = "chainConfig";

    /// Hours the fetched chain configuration stays cached
    pub const REGISTRY_CACHE_TTL_HOURS: u64 = 24;

    /// Timeout for registry requests in seconds
    pub const REGISTRY_REQUEST_TIMEOUT_SECONDS: u64 = 5;

    /// Status API bind address
    pub const WEB_HOST: &str = "0.0.0.0";

    /// Status API port
    pub const WEB_PORT: u16 = 8096;
}

/// Environment variable names
pub mod env {
    /// Deployment environment ("production" switches key prefix and branch)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";

    /// GitHub token used for registry requests
    pub const GITHUB_KEY: &str = "GITHUB_KEY";

    /// Overrides the configuration directory
    pub const CONFIG_DIR: &str = "RANKER_CONFIG_DIR";
}
