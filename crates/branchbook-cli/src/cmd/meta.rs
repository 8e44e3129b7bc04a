//! `bb meta`: show or patch book title, description, and payment address.

use std::io::Write;

use anyhow::Result;
use branchbook_core::Operation;
use branchbook_core::edit::MetaPatch;
use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, render};
use crate::store::Workspace;

#[derive(Args, Debug)]
pub struct MetaArgs {
    /// New book title.
    #[arg(long)]
    pub title: Option<String>,

    /// New book description.
    #[arg(long)]
    pub description: Option<String>,

    /// Lightning address (`name@domain.tld`) that receives payments.
    #[arg(long)]
    pub payment_address: Option<String>,
}

impl MetaArgs {
    fn patch(&self) -> Option<MetaPatch> {
        let patch = MetaPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            payment_address: self.payment_address.clone(),
        };
        (patch != MetaPatch::default()).then_some(patch)
    }
}

#[derive(Debug, Serialize)]
struct MetaOutput<'a> {
    title: &'a str,
    description: Option<&'a str>,
    payment_address: Option<&'a str>,
    updated: bool,
}

pub fn run_meta(args: &MetaArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = match args.patch() {
        Some(patch) => ws.apply(&Operation::SetMeta { patch }, output)?.1,
        None => ws.load(output)?,
    };

    let report = MetaOutput {
        title: &book.title,
        description: book.description.as_deref(),
        payment_address: book.payment_address.as_deref(),
        updated: args.patch().is_some(),
    };
    render(output, &report, |r, w| {
        if r.updated {
            writeln!(w, "✓ Updated book metadata")?;
        }
        pretty_kv(w, "Title", r.title)?;
        pretty_kv(w, "About", r.description.unwrap_or("-"))?;
        pretty_kv(w, "Pay to", r.payment_address.unwrap_or("-"))
    })
}
