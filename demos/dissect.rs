//! Reads URI references from stdin, one per line, and prints their
//! normalized components. Pass `--query` to decompose the query into pairs.

use std::{env, io};

use uri_dissect::ParsedUri;

fn main() {
    let decompose_query = env::args().skip(1).any(|arg| arg == "--query");

    for line in io::stdin().lines() {
        let line = line.expect("failed to read line");
        match uri_dissect::parse(&line) {
            Ok(uri) => print_uri(&uri, decompose_query),
            Err(e) => println!("error: {e} ({:?})", e.kind()),
        }
    }
}

fn print_uri(uri: &ParsedUri<String>, decompose_query: bool) {
    println!("{{");
    if let Some(scheme) = uri.scheme() {
        println!("  scheme = {:?},", scheme.as_str());
    }
    if let Some(userinfo) = uri.userinfo() {
        println!("  userinfo = {:?},", userinfo.as_str());
    }
    if let Some(host) = uri.host() {
        println!("  host = {host:?},");
    }
    if let Some(port) = uri.port() {
        println!("  port = {port:?},");
    }

    let path = uri.path();
    let segments: Vec<_> = path.segments().map(|seg| seg.as_str()).collect();
    println!("  path = {:?},", path.as_str());
    println!("  segments = {segments:?},");
    println!("  absolute = {},", path.is_absolute());
    println!("  trailing_slash = {},", path.has_trailing_slash());

    if decompose_query {
        if let Some(pairs) = uri.query_pairs() {
            println!("  query = {{");
            for pair in &pairs {
                match pair.value() {
                    Some(value) => println!("    {{ {:?}, {value:?} }},", pair.key()),
                    None => println!("    {{ {:?} }},", pair.key()),
                }
            }
            println!("  }},");
        }
    } else if let Some(query) = uri.query() {
        println!("  query = {:?},", query.as_str());
    }

    if let Some(fragment) = uri.fragment() {
        println!("  fragment = {:?},", fragment.as_str());
    }
    println!("}}");
}
