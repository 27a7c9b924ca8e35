use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod balance;
mod config;
mod error;
mod notification;
mod schemas;
mod store;

use crate::balance::{
    compute_balance_from_group, format_amount, my_balance, ordered_balances, settlement_amount,
};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::notification::Notification;
use crate::schemas::{Expense, Group, MemberName, NewExpense, NewGroup};
use crate::store::GroupStore;

#[derive(Serialize)]
struct GroupSummary {
    id: String,
    name: String,
    members: usize,
    expenses: usize,
}

#[derive(Serialize)]
struct GroupCreated {
    group: Group,
    notification: Notification,
}

#[derive(Serialize)]
struct ExpenseAdded {
    expense: Expense,
    notification: Notification,
}

#[derive(Serialize)]
struct ExpenseView {
    payer: MemberName,
    amount: f64,
    note: String,
    created_at: DateTime<Utc>,
    display: String,
}

#[derive(Serialize)]
struct MemberBalance {
    member: MemberName,
    balance: f64,
    formatted: String,
}

#[derive(Serialize)]
struct UserBalance {
    user: MemberName,
    balance: f64,
    formatted: String,
    settlement: f64,
    formatted_settlement: String,
    can_pay: bool,
}

#[put("/groups/{id}")]
async fn add_group(
    store: web::Data<GroupStore>,
    id: web::Path<String>,
    json: web::Json<NewGroup>,
) -> ApiResult<HttpResponse> {
    let group = json.into_inner().validate(id.into_inner()).map_err(|err| {
        warn!(%err, "rejected group");
        ApiError::from(err)
    })?;
    store.insert(group.clone())?;

    let notification = Notification::group_created(&group.name);
    notification.emit();
    Ok(HttpResponse::Created().json(GroupCreated {
        group,
        notification,
    }))
}

#[get("/groups")]
async fn list_groups(store: web::Data<GroupStore>) -> ApiResult<HttpResponse> {
    let summaries: Vec<GroupSummary> = store
        .list()?
        .into_iter()
        .map(|group| GroupSummary {
            members: group.members.len(),
            expenses: group.expenses.len(),
            id: group.id,
            name: group.name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(summaries))
}

#[get("/groups/{id}")]
async fn get_group(store: web::Data<GroupStore>, id: web::Path<String>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(store.snapshot(&id)?))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    store: web::Data<GroupStore>,
    config: web::Data<Config>,
    id: web::Path<String>,
    expense: web::Json<NewExpense>,
) -> ApiResult<HttpResponse> {
    let expense = expense.into_inner();
    let expense = store.add_expense(&id, |group| {
        expense.validate(&group.members).map_err(|err| {
            warn!(group = %group.id, %err, "rejected expense");
            ApiError::from(err)
        })
    })?;

    let notification = Notification::expense_added(&expense.payer, expense.amount, &config.currency);
    notification.emit();
    Ok(HttpResponse::Ok().json(ExpenseAdded {
        expense,
        notification,
    }))
}

#[get("/groups/{id}/expenses")]
async fn list_expenses(
    store: web::Data<GroupStore>,
    config: web::Data<Config>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let group = store.snapshot(&id)?;
    let views: Vec<ExpenseView> = group
        .expenses
        .into_iter()
        .map(|expense| ExpenseView {
            display: expense.display_line(&config.currency),
            payer: expense.payer,
            amount: expense.amount,
            note: expense.note,
            created_at: expense.created_at,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[get("/groups/{id}/balance")]
async fn get_balance(
    store: web::Data<GroupStore>,
    config: web::Data<Config>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let group = store.snapshot(&id)?;
    let sheet = compute_balance_from_group(&group);
    let balances: Vec<MemberBalance> = ordered_balances(&group.members, &sheet)
        .into_iter()
        .map(|(member, balance)| MemberBalance {
            formatted: format_amount(balance, &config.currency),
            member,
            balance,
        })
        .collect();
    Ok(HttpResponse::Ok().json(balances))
}

fn user_balance(group: &Group, user: MemberName, currency: &str) -> UserBalance {
    let balance = my_balance(&user, &group.members, &group.expenses);
    let settlement = settlement_amount(&user, &group.members, &group.expenses);
    UserBalance {
        formatted: format_amount(balance, currency),
        formatted_settlement: format_amount(settlement, currency),
        can_pay: settlement > 0.0,
        user,
        balance,
        settlement,
    }
}

#[get("/groups/{id}/balance/{user}")]
async fn get_user_balance(
    store: web::Data<GroupStore>,
    config: web::Data<Config>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (id, user) = path.into_inner();
    let group = store.snapshot(&id)?;
    Ok(HttpResponse::Ok().json(user_balance(&group, user, &config.currency)))
}

#[post("/groups/{id}/pay/{user}")]
async fn pay(
    store: web::Data<GroupStore>,
    config: web::Data<Config>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (id, user) = path.into_inner();
    let group = store.snapshot(&id)?;
    let amount = settlement_amount(&user, &group.members, &group.expenses);
    if amount <= 0.0 {
        return Err(ApiError::NothingOwed(user));
    }

    info!(group = %id, %user, amount, "payment confirmed");
    let notification = Notification::payment_registered(amount, &config.currency);
    notification.emit();
    Ok(HttpResponse::Ok().json(notification))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_groups)
        .service(add_group)
        .service(get_group)
        .service(add_expense)
        .service(list_expenses)
        .service(get_balance)
        .service(get_user_balance)
        .service(pay);
}

fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default().allow_any_method().allow_any_header();
    if origins.is_empty() {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    info!(host = %config.host, port = config.port, currency = %config.currency, "starting server");

    let store = web::Data::new(GroupStore::new());
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config.cors_origins))
            .app_data(store.clone())
            .app_data(config.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
