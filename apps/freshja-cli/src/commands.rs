//! Subcommand handlers
//!
//! Results go to stdout; logs stay on stderr.

use eyre::Result;
use freshja_client::{
    CartLine, Checkout, FarmerDocuments, FreshJa, FullSync, LikedProduct, Order, Product,
    ProductQuery, Registration,
};
use tracing::warn;

use crate::{CartCommands, Commands, LikeCommands, OrderCommands, ProductCommands, ResetCommands};

pub async fn run(client: &FreshJa, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let (session, sync) = client.login(&email, &password).await?;
            println!("Signed in as {} ({})", session.user.full_name, session.user.role);
            print_sync(&sync);
        }

        Commands::Register {
            name,
            email,
            phone,
            password,
            role,
            license,
            trn,
            permit,
        } => {
            let documents = match (license, trn, permit) {
                (Some(license), Some(trn), Some(permit)) => Some(FarmerDocuments {
                    license,
                    trn,
                    permit,
                }),
                _ => None,
            };
            let registration = Registration {
                full_name: name,
                email,
                phone,
                password,
                role,
                documents,
            };
            let (session, sync) = client.register(&registration).await?;
            println!("Welcome, {}", session.user.full_name);
            print_sync(&sync);
        }

        Commands::Logout => {
            client.auth.logout().await?;
            println!("Signed out");
        }

        Commands::Whoami => match client.auth.current_user().await? {
            Some(user) => println!("{} <{}> ({})", user.full_name, user.email, user.role),
            None => println!("Not signed in"),
        },

        Commands::Products { command } => products(client, command).await?,
        Commands::Cart { command } => cart(client, command).await?,
        Commands::Likes { command } => likes(client, command).await?,
        Commands::Orders { command } => orders(client, command).await?,

        Commands::Sync => {
            let sync = client.sync().await?;
            print_sync(&sync);
        }

        Commands::Reset { command } => reset(client, command).await?,
    }

    Ok(())
}

async fn products(client: &FreshJa, command: ProductCommands) -> Result<()> {
    match command {
        ProductCommands::List {
            category,
            page,
            limit,
        } => {
            let query = ProductQuery {
                category,
                page,
                limit,
                ..Default::default()
            };
            let page = client.products.list(&query).await?;
            print_products(&page.products);
            println!(
                "Page {} of {} ({} products)",
                page.current_page, page.total_pages, page.total
            );
        }
        ProductCommands::Search { term } => {
            let results = client.products.search(&term).await?;
            print_products(&results.products);
        }
        ProductCommands::Featured => print_products(&client.products.featured().await?),
        ProductCommands::Show { id } => {
            let product = client.products.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
    }
    Ok(())
}

async fn cart(client: &FreshJa, command: CartCommands) -> Result<()> {
    let lines = match command {
        CartCommands::List => client.cart.items().await?,
        CartCommands::Add {
            product_id,
            quantity,
        } => {
            let product = client.products.get(product_id).await?;
            client.cart.add(&product, quantity).await?
        }
        CartCommands::Update {
            product_id,
            quantity,
        } => client.cart.update(product_id, quantity).await?,
        CartCommands::Remove { product_id } => client.cart.remove(product_id).await?,
        CartCommands::Clear => {
            client.cart.clear().await?;
            Vec::new()
        }
    };
    print_cart(&lines);
    Ok(())
}

async fn likes(client: &FreshJa, command: LikeCommands) -> Result<()> {
    match command {
        LikeCommands::List => print_likes(&client.likes.list().await?),
        LikeCommands::Toggle { product_id } => {
            let product = client.products.get(product_id).await?;
            if client.likes.toggle(&product).await? {
                println!("Liked {}", product.name);
            } else {
                println!("Unliked {}", product.name);
            }
        }
    }
    Ok(())
}

async fn orders(client: &FreshJa, command: OrderCommands) -> Result<()> {
    match command {
        OrderCommands::Create {
            payment_method,
            time_slot,
        } => {
            let items = client.cart.items().await?;
            let placed = client
                .orders
                .create(&Checkout {
                    items,
                    payment_method,
                    time_slot,
                    ..Default::default()
                })
                .await?;
            client.cart.clear().await?;

            if placed.order.is_local() {
                println!("Order saved on this device; it will be sent on the next sync");
            }
            print_order(&placed.order);
        }
        OrderCommands::List => {
            let orders = client.orders.my_orders().await?;
            if orders.is_empty() {
                println!("No orders yet");
            }
            for order in &orders {
                print_order(order);
            }
        }
        OrderCommands::Show { id } => {
            let order = client.orders.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        OrderCommands::Cancel { id } => {
            let order = client.orders.cancel(&id).await?;
            print_order(&order);
        }
    }
    Ok(())
}

async fn reset(client: &FreshJa, command: ResetCommands) -> Result<()> {
    match command {
        ResetCommands::Forgot { email } => {
            let sent = client.auth.forgot_password(&email).await?;
            println!("{}", sent.message);
            println!("User id: {}", sent.user_id);
        }
        ResetCommands::Verify { user_id, code } => {
            println!("{}", client.auth.verify_code(user_id, &code).await?.message);
        }
        ResetCommands::Password {
            user_id,
            code,
            new_password,
        } => {
            let done = client
                .auth
                .reset_password(user_id, &code, &new_password)
                .await?;
            println!("{}", done.message);
        }
    }
    Ok(())
}

fn print_sync(sync: &FullSync) {
    if sync.outbox.applied + sync.orders.synced > 0 {
        println!(
            "Synced {} change(s) and {} order(s)",
            sync.outbox.applied, sync.orders.synced
        );
    }
    for (entry, err) in &sync.outbox.rejected {
        println!("Dropped queued change {:?}: {}", entry.mutation, err);
    }
    for (order, err) in &sync.orders.rejected {
        println!("Dropped local order {}: {}", order.id, err);
    }
    if let Some(err) = &sync.outbox.error {
        warn!(remaining = sync.outbox.remaining, "Queued changes not sent: {}", err);
    }
    if let Some(err) = &sync.orders.error {
        warn!(remaining = sync.orders.remaining, "Local orders not sent: {}", err);
    }
}

fn print_products(products: &[Product]) {
    for product in products {
        let price = match product.discount_price {
            Some(discount) => format!("J${:.2} (was J${:.2})", discount, product.price),
            None => format!("J${:.2}", product.price),
        };
        println!(
            "{}  {:<28} {:<12} {}/{}",
            product.id, product.name, product.category, price, product.unit
        );
    }
}

fn print_cart(lines: &[CartLine]) {
    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }
    let mut subtotal = 0.0;
    for line in lines {
        let amount = line.price * f64::from(line.quantity);
        subtotal += amount;
        println!(
            "{}  {:<28} x{:<3} J${:.2}",
            line.id, line.name, line.quantity, amount
        );
    }
    println!("Subtotal: J${:.2}", subtotal);
}

fn print_likes(likes: &[LikedProduct]) {
    if likes.is_empty() {
        println!("No liked products");
    }
    for like in likes {
        println!("{}  {:<28} J${:.2}", like.id, like.name, like.price);
    }
}

fn print_order(order: &Order) {
    println!(
        "{}  {:<10} {} item(s)  total J${:.2}  {}",
        order.id,
        order.status,
        order.items.len(),
        order.total,
        order.created_at.format("%Y-%m-%d %H:%M")
    );
}
