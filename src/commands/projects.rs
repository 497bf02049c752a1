// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, required};
use crate::models::{NewProject, Project, ProjectPatch};
use crate::service::Ledger;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewProject {
                name: required(sub, "name")?.trim().to_string(),
                client_name: required(sub, "client")?.trim().to_string(),
                project_type: required(sub, "type")?.trim().to_string(),
                status: optional(sub, "status"),
                total_amount: optional(sub, "total")
                    .map(|s| parse_decimal(&s))
                    .transpose()?,
                description: optional(sub, "description"),
                client_phone: optional(sub, "phone"),
                client_email: optional(sub, "email"),
                ..NewProject::default()
            };
            let p = ledger.create_project(&new)?;
            println!("Added project #{} '{}' for {}", p.id, p.name, p.client_name);
        }
        Some(("list", sub)) => {
            let data = ledger.list_projects()?;
            print_projects(sub, &data)?;
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let p = ledger.get_project(id)?;
            print_projects(sub, &[p])?;
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let patch = ProjectPatch {
                name: optional(sub, "name"),
                client_name: optional(sub, "client"),
                project_type: optional(sub, "type"),
                status: optional(sub, "status"),
                total_amount: optional(sub, "total")
                    .map(|s| parse_decimal(&s))
                    .transpose()?,
                description: optional(sub, "description"),
                client_phone: optional(sub, "phone"),
                client_email: optional(sub, "email"),
                ..ProjectPatch::default()
            };
            let p = ledger.update_project(id, &patch)?;
            println!("Updated project #{} '{}' ({})", p.id, p.name, p.status);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            ledger.delete_project(id)?;
            println!("Removed project #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn print_projects(sub: &clap::ArgMatches, data: &[Project]) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.name.clone(),
                    p.client_name.clone(),
                    p.status.clone(),
                    p.total_amount.as_ref().map(fmt_money).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Client", "Status", "Total"], rows)
        );
    }
    Ok(())
}
