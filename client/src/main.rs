use std::net::{IpAddr, SocketAddr};

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use log::debug;
use nat_probe::client::{Client, ClientConfig, DEFAULT_SERVER_ADDR, DEFAULT_SOFTWARE_NAME};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ip 或者 ip:port
fn parse_local(s: &str) -> Result<SocketAddr, String> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    match s.parse::<IpAddr>() {
        Ok(ip) => Ok(SocketAddr::new(ip, 0)),
        Err(e) => Err(format!("{}", e)),
    }
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() {
    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client for probing nat")
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .takes_value(true)
                .default_value(DEFAULT_SERVER_ADDR)
                .help("STUN server address, host:port")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("local")
                .short('l')
                .long("local")
                .takes_value(true)
                .help("local address to bind, ip or ip:port")
                .value_parser(ValueParser::new(parse_local)),
        )
        .arg(
            Arg::new("software")
                .long("software")
                .takes_value(true)
                .default_value(DEFAULT_SOFTWARE_NAME)
                .help("value of the SOFTWARE attribute")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("behavior")
                .short('b')
                .long("behavior")
                .action(ArgAction::SetTrue)
                .help("enable NAT behavior test mode"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .takes_value(true)
                .default_value("0")
                .help("verbose level, 0: none, 1: verbose, 2: double verbose, 3: triple verbose")
                .value_parser(clap::value_parser!(u8).range(0..=3)),
        )
        .get_matches();

    let verbose: u8 = *app.get_one("verbose").expect("wrong verbose level");
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level(verbose))).init();

    let server: &String = app.get_one("server").expect("wrong server address");
    let software: &String = app.get_one("software").expect("wrong software name");
    let local_addr: Option<SocketAddr> = app.get_one::<SocketAddr>("local").copied();
    let behavior: bool = *app.get_one("behavior").expect("wrong behavior flag");

    let config = ClientConfig {
        server: server.clone(),
        software: software.clone(),
        local_addr,
        ..ClientConfig::default()
    };
    debug!("config: {:?}", config);

    let mut client = Client::new(config);

    if behavior {
        match client.behavior_test().await {
            Ok(v) => {
                println!("  Mapping Behavior: {}", v.mapping);
                println!("Filtering Behavior: {}", v.filtering);
                println!("   Normal NAT Type: {}", v.normal_type());
                print_host(v.host);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match client.discover().await {
        Ok(v) => {
            println!("NAT Type: {}", v.nat_type);
            print_host(v.host);
        }
        Err(e) => {
            eprintln!("NAT Type: {}", e.nat_type());
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_host(host: Option<nat_probe::Host>) {
    if let Some(host) = host {
        println!("External IP Family: {}", host.family());
        println!("External IP: {}", host.ip());
        println!("External Port: {}", host.port());
    }
}
