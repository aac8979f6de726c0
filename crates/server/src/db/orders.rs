//! Order repository for database operations.
//!
//! An order spans two tables: the `orders` row (amount, payment, status,
//! address snapshot) and its `order_items` children. Creation writes both in
//! one transaction; reads stitch them back together.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use trellis_core::{OrderId, OrderStatus, PaymentMethod, UserId};

use super::RepositoryError;
use crate::models::{AddressSnapshot, AdminOrder, Order, OrderItem};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    address: Json<AddressSnapshot>,
    amount: Decimal,
    payment_method: String,
    payment: bool,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let payment_method = self.payment_method.parse::<PaymentMethod>().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.id))
        })?;
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items,
            address: self.address.0,
            amount: self.amount,
            payment_method,
            payment: self.payment,
            status,
            date: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    order_id: i64,
    product_id: String,
    name: String,
    size: String,
    quantity: i32,
    price: Decimal,
}

impl ItemRow {
    fn into_domain(self) -> Result<(i64, OrderItem), RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {}: negative item quantity {}",
                self.order_id, self.quantity
            ))
        })?;

        Ok((
            self.order_id,
            OrderItem {
                product_id: self.product_id,
                name: self.name,
                size: self.size,
                quantity,
                price: self.price,
            },
        ))
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, address, amount, payment_method, payment, status, created_at";
const ITEM_COLUMNS: &str = "order_id, product_id, name, size, quantity, price";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order and its line items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; nothing is
    /// persisted in that case.
    pub async fn insert(
        &self,
        user_id: UserId,
        items: &[OrderItem],
        address: &AddressSnapshot,
        amount: Decimal,
        payment_method: PaymentMethod,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, address, amount, payment_method)
             VALUES ($1, $2, $3, $4)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(Json(address))
        .bind(amount)
        .bind(payment_method.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            let quantity = i32::try_from(item.quantity).unwrap_or(i32::MAX);
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, size, quantity, price)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(&item.size)
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_domain(items.to_vec())
    }

    /// Get an order by id, with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items_by_order = self.items_for(&[row.id]).await?;
        let items = items_by_order.remove(&row.id).unwrap_or_default();

        Ok(Some(row.into_domain(items)?))
    }

    /// Mark an order's payment flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment(&self, id: OrderId, payment: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET payment = $1 WHERE id = $2")
            .bind(payment)
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set an order's delivery-progress status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an order (line items cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List one user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        self.stitch(rows).await
    }

    /// List every order with purchaser name/email joined in, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AdminOrderRow {
            #[sqlx(flatten)]
            order: OrderRow,
            user_name: String,
            user_email: String,
        }

        let rows = sqlx::query_as::<_, AdminOrderRow>(&format!(
            "SELECT o.id, o.user_id, o.address, o.amount, o.payment_method, o.payment,
                    o.status, o.created_at, u.name AS user_name, u.email AS user_email
             FROM orders o
             JOIN users u ON u.id = o.user_id
             ORDER BY o.created_at DESC, o.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.order.id).collect();
        let mut items_by_order = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|r| {
                let items = items_by_order.remove(&r.order.id).unwrap_or_default();
                Ok(AdminOrder {
                    order: r.order.into_domain(items)?,
                    user_name: r.user_name,
                    user_email: r.user_email,
                })
            })
            .collect()
    }

    /// Fetch line items for a set of orders, grouped by order id.
    async fn items_for(
        &self,
        order_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id ASC"
        ))
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let (order_id, item) = row.into_domain()?;
            grouped.entry(order_id).or_default().push(item);
        }

        Ok(grouped)
    }

    /// Stitch order rows with their items.
    async fn stitch(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut items_by_order = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_domain(items)
            })
            .collect()
    }
}
