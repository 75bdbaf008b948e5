use std::collections::HashMap;
use std::sync::Arc;

use colored::Colorize;

use crate::agent::{DeckBuilderAgent, StubDeckBuilderModel};
use crate::config::Config;
use crate::fsm::Orchestrator;
use crate::model::{BuildRequest, Card, DeckResult};
use crate::repository::CardRepository;
use crate::store::{CardStore, SqliteCardStore};
use crate::vector::{DisabledVectorStore, InMemoryVectorStore, VectorStore};
use crate::verifier::StubImprovementAdvisor;

use super::args::BuildArgs;

fn card(id: &str, name: &str, cost: &str, cmc: f64, colors: &[&str], type_line: &str, oracle: &str) -> Card {
    let mut legalities = HashMap::new();
    for format in ["standard", "modern", "pioneer", "legacy", "vintage", "commander", "brawl"] {
        legalities.insert(format.to_string(), "legal".to_string());
    }
    let types = type_line
        .split(" — ")
        .next()
        .unwrap_or(type_line)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let subtypes = type_line
        .split(" — ")
        .nth(1)
        .map(|s| s.split_whitespace().map(|w| w.to_string()).collect())
        .unwrap_or_default();

    Card {
        id: id.to_string(),
        name: name.to_string(),
        mana_cost: Some(cost.to_string()),
        cmc,
        colors: colors.iter().map(|c| c.to_string()).collect(),
        color_identity: colors.iter().map(|c| c.to_string()).collect(),
        type_line: type_line.to_string(),
        types,
        subtypes,
        oracle_text: oracle.to_string(),
        power: None,
        toughness: None,
        loyalty: None,
        set_code: "DEM".to_string(),
        rarity: "common".to_string(),
        legalities,
        keywords: Vec::new(),
    }
}

/// A small, varied fixture pool standing in for a real card database. Real
/// deployments point `MTG_DB_PATH` at a populated SQLite file instead.
fn demo_card_pool() -> Vec<Card> {
    vec![
        card("goblin-guide", "Goblin Guide", "R", 1.0, &["R"], "Creature — Goblin Scout", "Haste"),
        card("monastery-swiftspear", "Monastery Swiftspear", "R", 1.0, &["R"], "Creature — Human Monk", "Haste. Prowess"),
        card("lightning-bolt", "Lightning Bolt", "R", 1.0, &["R"], "Instant", "Lightning Bolt deals 3 damage to any target."),
        card("eidolon-of-the-great-revel", "Eidolon of the Great Revel", "RR", 2.0, &["R"], "Creature — Spirit", "Whenever a player casts a spell, Eidolon of the Great Revel deals 2 damage to that player."),
        card("hellrider", "Hellrider", "RR", 3.0, &["R"], "Creature — Human Warrior", "Haste. Whenever a creature you control attacks, Hellrider deals 1 damage to the defending player."),
        card("huntmaster-of-the-fells", "Huntmaster of the Fells", "RG", 4.0, &["R", "G"], "Creature — Human Werewolf", "Whenever this creature enters the battlefield, create a 2/2 green Wolf creature token and you gain 2 life."),
        card("questing-beast", "Questing Beast", "RGG", 4.0, &["R", "G"], "Legendary Creature — Beast", "Vigilance, deathtouch, haste. Questing Beast can't be blocked by creatures with power 2 or less."),
        card("llanowar-elves", "Llanowar Elves", "G", 1.0, &["G"], "Creature — Elf Druid", "Tap: Add G."),
        card("scavenging-ooze", "Scavenging Ooze", "G", 2.0, &["G"], "Creature — Ooze", "Exile target card from a graveyard. If it was a creature card, put a +1/+1 counter on Scavenging Ooze."),
        card("craterhoof-behemoth", "Craterhoof Behemoth", "GGGG", 8.0, &["G"], "Creature — Beast", "Trample. When Craterhoof Behemoth enters the battlefield, creatures you control get +X/+X and gain trample until end of turn."),
        card("counterspell", "Counterspell", "UU", 2.0, &["U"], "Instant", "Counter target spell."),
        card("snapcaster-mage", "Snapcaster Mage", "U", 2.0, &["U"], "Creature — Human Wizard", "When Snapcaster Mage enters the battlefield, target instant or sorcery card in your graveyard gains flashback."),
        card("thoughtseize", "Thoughtseize", "B", 1.0, &["B"], "Sorcery", "Target player reveals their hand. You choose a nonland card from it. That player discards that card."),
        card("murderous-rider", "Murderous Rider", "BB", 2.0, &["B"], "Creature — Human Knight", "Destroy target creature or planeswalker."),
        card("wrath-of-god", "Wrath of God", "WW", 2.0, &["W"], "Sorcery", "Destroy all creatures. They can't be regenerated."),
        card("restoration-angel", "Restoration Angel", "WW", 3.0, &["W"], "Creature — Angel", "Flash. Flying. When Restoration Angel enters the battlefield, you may exile target non-Angel creature you control, then return it to the battlefield."),
    ]
}

async fn build_repository(config: &Config) -> Arc<CardRepository> {
    let store = Arc::new(SqliteCardStore::open_in_memory().expect("in-memory sqlite store"));
    let cards = demo_card_pool();
    store.bulk_insert_cards(&cards).await.expect("seed demo card pool");

    let vector_store: Arc<dyn VectorStore> = if config.vector_store_enabled {
        let vs = InMemoryVectorStore::new();
        vs.upsert_cards(&cards).await.expect("seed vector store");
        Arc::new(vs)
    } else {
        Arc::new(DisabledVectorStore)
    };

    Arc::new(CardRepository::new(store, vector_store, config.cache_l2_max_size))
}

fn build_orchestrator(repository: Arc<CardRepository>) -> Orchestrator {
    // Without live provider credentials this falls back to the deterministic
    // stub model/advisor, matching the degraded-rather-than-erroring posture
    // documented for missing API keys.
    let agent = DeckBuilderAgent::new(Box::new(StubDeckBuilderModel::new()), repository);
    Orchestrator::new(agent, Box::new(StubImprovementAdvisor::new()))
}

fn print_result(result: &DeckResult) {
    if !result.success {
        println!("{} {}", "build failed:".red().bold(), result.error.as_deref().unwrap_or("unknown error"));
        return;
    }

    let deck = result.deck.as_ref().expect("successful result carries a deck");
    println!(
        "{} {} {} deck, {} cards, {} iteration(s)",
        "built".green().bold(),
        deck.archetype,
        deck.format,
        deck.total_cards,
        result.iteration_count,
    );

    if let Some(quality) = &result.quality {
        println!(
            "quality: overall {:.2} (curve {:.2}, lands {:.2}, synergy {:.2}, consistency {:.2})",
            quality.overall_score, quality.mana_curve, quality.land_ratio, quality.synergy, quality.consistency
        );
        for issue in &quality.issues {
            println!("  {} {}", "issue:".yellow(), issue);
        }
    }

    for modification in &result.modifications {
        println!("  {} {}", "change:".cyan(), modification);
    }

    let mut by_name: Vec<_> = deck.cards.iter().collect();
    by_name.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.card.name.cmp(&b.card.name)));
    for dc in by_name {
        println!("  {}x {}", dc.quantity, dc.card.name);
    }
}

pub async fn handle_build_command(args: BuildArgs) {
    let config = Config::from_env();
    let repository = build_repository(&config).await;
    let orchestrator = build_orchestrator(repository);

    let request: BuildRequest = args.into_request();
    let result = orchestrator.build_new_deck(request).await;
    print_result(&result);
}

pub async fn handle_modify_command(args: BuildArgs, prompt: String, skip_quality_check: bool) {
    let config = Config::from_env();
    let repository = build_repository(&config).await;
    let orchestrator = build_orchestrator(repository);

    let request: BuildRequest = args.into_request();
    let initial = orchestrator.build_new_deck(request.clone()).await;
    if !initial.success {
        print_result(&initial);
        return;
    }

    let deck = initial.deck.expect("successful build carries a deck");
    println!("{}", "initial deck:".cyan().bold());
    print_result(&initial);

    let modified = orchestrator
        .modify_deck(deck, &prompt, request, !skip_quality_check)
        .await;
    println!();
    println!("{}", "after modification:".cyan().bold());
    print_result(&modified);
}
