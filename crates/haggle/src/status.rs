// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haggle status` command implementation.
//!
//! Prints the unread badge and the conversation list, optionally filtered
//! by kind.

use std::str::FromStr;

use colored::Colorize;

use haggle_config::model::HaggleConfig;
use haggle_core::error::HaggleError;
use haggle_core::types::{ChatKind, Conversation, ConversationFilter};

use crate::context;

/// Runs the `haggle status` command.
pub async fn run_status(config: &HaggleConfig, filter: &str) -> Result<(), HaggleError> {
    let filter = ConversationFilter::from_str(filter)
        .map_err(|_| HaggleError::Validation(format!("unknown filter `{filter}`")))?;

    let api = context::build_api(config)?;

    let unread = api.unread_count().await?;
    let page = api.list_conversations(filter).await?;

    if unread > 0 {
        println!("{}", format!("{unread} unread").bold().red());
    } else {
        println!("{}", "all caught up".green());
    }
    println!(
        "{} conversations ({} product, {} direct)\n",
        page.total_count, page.product_chats, page.direct_chats
    );

    for conv in &page.chats {
        println!("{}", format_conversation(conv));
    }

    Ok(())
}

fn format_conversation(conv: &Conversation) -> String {
    let badge = if conv.unread_count > 0 {
        format!(" [{}]", conv.unread_count).red().to_string()
    } else {
        String::new()
    };
    let context = match (conv.kind, &conv.listing) {
        (ChatKind::Product, Some(listing)) => format!(" ({} · {})", listing.kind, listing.title),
        _ => String::new(),
    };
    let preview = conv
        .last_message
        .as_ref()
        .map(|p| format!(" — {}", p.content))
        .unwrap_or_default();
    format!(
        "{}  {}{}{}{}",
        conv.id.0.dimmed(),
        conv.peer.display_name.bold(),
        context,
        badge,
        preview
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use haggle_core::types::{ConversationId, ListingKind, ListingRef, Peer, UserId};

    fn conversation() -> Conversation {
        Conversation {
            id: ConversationId("7".into()),
            kind: ChatKind::Product,
            peer: Peer {
                id: UserId("u-2".into()),
                display_name: "Sam".into(),
                avatar_url: None,
            },
            listing: Some(ListingRef {
                id: 42,
                kind: ListingKind::Job,
                title: "Barista wanted".into(),
                thumbnail_url: None,
                price: None,
            }),
            last_message: None,
            unread_count: 2,
        }
    }

    #[test]
    fn formats_listing_context_and_badge() {
        let line = format_conversation(&conversation());
        assert!(line.contains("Sam"));
        assert!(line.contains("job · Barista wanted"));
        assert!(line.contains("[2]"));
    }

    #[test]
    fn unknown_filter_is_a_validation_error() {
        let result = ConversationFilter::from_str("archived");
        assert!(result.is_err());
    }
}
