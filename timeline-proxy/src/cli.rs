use std::env;
use std::net::SocketAddr;
use std::process;

use getopts::Options;
use tokio::time::Duration;

use crate::cache;

pub const ADDR_ENV: &str = "TIMELINE_PROXY_ADDR";
pub const SHEET_URL_ENV: &str = "TIMELINE_SHEET_URL";

#[derive(Debug)]
pub struct Args {
    pub address: SocketAddr,
    pub sheet_url: String,
    pub cache: cache::Config,
}

#[derive(Debug)]
enum Parsed {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "u",
        "sheet-url",
        "URL of the published sheet in CSV format [Env: TIMELINE_SHEET_URL]",
        "URL",
    );
    opts.optflag(
        "c",
        "enable-cache",
        "Enable caching of parsed timelines [Default: false]",
    );
    opts.optopt(
        "t",
        "cache-ttl",
        "Time-to-live for cached timelines [Default: 3600]",
        "SECONDS",
    );
    opts
}

pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Args {
    match try_parse(args, |key| env::var(key).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn try_parse<I, E>(args: I, env: E) -> Result<Parsed, String>
where
    I: IntoIterator<Item = String>,
    E: Fn(&str) -> Option<String>,
{
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let address: SocketAddr = match matches.opt_str("address").or_else(|| env(ADDR_ENV)) {
        Some(value) => value
            .parse()
            .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let sheet_url = matches
        .opt_str("sheet-url")
        .or_else(|| env(SHEET_URL_ENV))
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            format!("Error: sheet URL not configured, pass --sheet-url or set {SHEET_URL_ENV}")
        })?;

    let enabled = matches.opt_present("enable-cache");

    let ttl = matches
        .opt_get_default("cache-ttl", 3600)
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option 'cache-ttl' is invalid: {err}"))?;

    Ok(Parsed::Run(Args {
        address,
        sheet_url,
        cache: cache::Config { enabled, ttl },
    }))
}
