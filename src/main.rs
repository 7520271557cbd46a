use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use price_advisor::api::HttpApi;
use price_advisor::config::Config;
use price_advisor::controller::Controller;
use price_advisor::view::{ViewEffects, ViewState};

/// Effects sink for the terminal: section changes and alerts go to stdout.
struct ConsoleEffects;

impl ViewEffects for ConsoleEffects {
    fn section_hidden(&mut self, _section: ViewState) {}

    fn section_shown(&mut self, section: ViewState) {
        println!("== {section:?} ==");
    }

    fn scrolled_to(&mut self, _section: ViewState) {}

    fn alert(&mut self, message: &str) {
        println!("[!] {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    tracing::info!(api_base = %config.api_base, "Starting price advisor");

    let api = Arc::new(HttpApi::new(config.api_base.clone()));
    let controller = Arc::new(Controller::new(api, Box::new(ConsoleEffects), config));

    controller.load_latest().await;
    print_latest(&controller);

    println!("Commands: open | close | back | name <text> | price <n> | category <v> | condition <v> | pick <i> | submit | latest | ts <i> | show | quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else { break };
        let line = line?;
        let (command, rest) = match line.trim().split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "open" => controller.open_form(),
            "close" => controller.close_form(),
            "back" => controller.go_back(),
            "name" => {
                // Each keystroke event arrives as the field's full text; the
                // debounce inside the controller coalesces the burst.
                let text = rest.to_string();
                let c = controller.clone();
                tokio::spawn(async move { c.query_input(&text).await });
            }
            "price" => controller.set_price_input(rest),
            "category" => controller.category_changed(rest),
            "condition" => controller.set_condition(rest),
            "pick" => {
                if let Ok(index) = rest.parse::<usize>() {
                    controller.select_suggestion(index);
                }
            }
            "submit" => {
                controller.submit().await;
                print_results(&controller);
            }
            "latest" => print_latest(&controller),
            "ts" => {
                if let Ok(index) = rest.parse::<usize>() {
                    controller.toggle_timestamp(index);
                }
                print_latest(&controller);
            }
            "show" => print_view(&controller),
            "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {other}"),
        }
    }

    Ok(())
}

fn print_view(controller: &Controller) {
    let view = controller.view();
    println!("section:   {:?}", view.state());
    println!("name:      {}", view.product_name);
    println!("price:     {}", view.price_input);
    println!("category:  {}", view.selected_category);
    if view.condition_visible {
        println!("condition: {}", view.condition_value);
    }
    if !view.suggestions.is_empty() {
        println!("suggestions:");
        for (i, item) in view.suggestions.iter().enumerate() {
            println!("  [{i}] {} ({})", item.product_name, item.main_category);
        }
    }
}

fn print_results(controller: &Controller) {
    let view = controller.view();
    for line in [
        view.results.headline(),
        view.results.range_text(),
        view.results.confidence_text(),
    ] {
        if !line.is_empty() {
            println!("{line}");
        }
    }
}

fn print_latest(controller: &Controller) {
    let view = controller.view();
    if view.latest.is_empty() {
        return;
    }
    println!("Latest predictions:");
    for (i, card) in view.latest.iter().enumerate() {
        println!(
            "  [{i}] {} -> {}",
            card.input.product_name,
            price_advisor::view::format_price(card.prediction)
        );
        if card.timestamp_visible {
            println!("      {}", card.timestamp_text());
        }
    }
}
