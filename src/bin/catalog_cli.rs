// src/bin/catalog_cli.rs
//
// Terminal front-end for the catalog API: list, show, create, edit and delete products.

use clap::{Args, Parser, Subcommand};
use product_catalog::client::view::render_card;
use product_catalog::client::{CatalogView, ProductForm};
use product_catalog::infra::telemetry;
use product_catalog::ProductClient;
use std::io::{self, BufRead, Write};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "catalog_cli", about = "Manage the product catalog from the terminal")]
struct Cli {
    /// API base URL including the `/api` prefix.
    #[arg(long, env = "CATALOG_API_URL")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every product, newest first.
    List,
    /// Show one product.
    Show { id: String },
    /// Add a new product.
    Create(CreateArgs),
    /// Change selected fields of a product.
    Edit {
        id: Uuid,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete a product.
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    sku: String,
    #[arg(long)]
    stock: String,
    #[arg(long, default_value = "")]
    image_url: String,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    stock: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

impl EditArgs {
    fn apply(self, form: &mut ProductForm) {
        let fields = [
            (self.name, &mut form.name),
            (self.description, &mut form.description),
            (self.price, &mut form.price),
            (self.sku, &mut form.sku),
            (self.stock, &mut form.stock),
            (self.image_url, &mut form.image_url),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();
    let cli = Cli::parse();

    let client = ProductClient::new(cli.api_url)?;
    let mut view = CatalogView::new();

    match cli.command {
        Command::List => {
            view.refresh(&client).await;
            if let Some(e) = view.load_error.take() {
                anyhow::bail!(e);
            }
            if view.products.is_empty() {
                println!("No products registered yet.");
            }
            for product in &view.products {
                println!("{}\n", render_card(product));
            }
        }
        Command::Show { id } => {
            let product = client.get_product(&id).await?;
            println!("{}", render_card(&product));
        }
        Command::Create(args) => {
            let form = ProductForm {
                name: args.name,
                description: args.description,
                price: args.price,
                sku: args.sku,
                stock: args.stock,
                image_url: args.image_url,
            };
            let product = view
                .submit_create(&client, &form)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("Created:\n{}", render_card(&product));
        }
        Command::Edit { id, changes } => {
            let current = client.get_product(&id.to_string()).await?;
            view.load(Ok(vec![current]));
            let mut form = view
                .begin_edit(id)
                .ok_or_else(|| anyhow::anyhow!("Product not found."))?;
            changes.apply(&mut form);
            let product = view
                .submit_update(&client, id, &form)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("Updated:\n{}", render_card(&product));
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete product {}?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            view.remove(&client, id).await.map_err(anyhow::Error::msg)?;
            println!("Deleted {}.", id);
        }
    }
    Ok(())
}
