//! Cart draft
//!
//! Mutable collection of cart lines. Adding a selection merges into an
//! existing line with the same content key; weighed items always append.
//! Every mutation validates its input before touching state, so a
//! rejected call leaves the draft unchanged.

use crate::error::{OrderError, OrderResult};
use crate::keying;
use crate::pricing;
use rust_decimal::Decimal;
use shared::models::Product;
use shared::order::{CartLine, ExtraChoice, ProductRef, VarietyChoice};
use tracing::debug;

/// Validate a catalog selection and snapshot it into line components.
///
/// Checks active flags, per-extra quantity caps, and the product's
/// distinct-extras constraint.
pub(crate) fn build_selection(
    product: &Product,
    variety_id: Option<&str>,
    extras: &[(&str, u32)],
) -> OrderResult<(ProductRef, Option<VarietyChoice>, Vec<ExtraChoice>)> {
    if !product.is_active {
        return Err(OrderError::InactiveSelection(product.id.clone()));
    }
    pricing::require_price(product.price)?;

    let variety = match variety_id {
        Some(variety_id) => {
            let variety = product.variety(variety_id).ok_or_else(|| {
                OrderError::InvalidOperation(format!(
                    "unknown variety {} for product {}",
                    variety_id, product.id
                ))
            })?;
            if !variety.is_active {
                return Err(OrderError::InactiveSelection(variety.id.clone()));
            }
            pricing::require_price(variety.price)?;
            Some(VarietyChoice {
                id: variety.id.clone(),
                name: variety.name.clone(),
                price: variety.price,
            })
        }
        None => None,
    };

    if let Some(max) = product.max_extras
        && extras.len() as u32 > max
    {
        return Err(OrderError::TooManyExtras { max });
    }

    let mut choices: Vec<ExtraChoice> = Vec::with_capacity(extras.len());
    for (extra_id, quantity) in extras {
        let extra = product.extra(extra_id).ok_or_else(|| {
            OrderError::InvalidOperation(format!(
                "unknown extra {} for product {}",
                extra_id, product.id
            ))
        })?;
        if !extra.is_active {
            return Err(OrderError::InactiveSelection(extra.id.clone()));
        }
        if *quantity == 0 {
            return Err(OrderError::InvalidQuantity(0));
        }
        if *quantity > extra.max_quantity {
            return Err(OrderError::ExtraQuantityExceeded {
                extra: extra.id.clone(),
                max: extra.max_quantity,
            });
        }
        pricing::require_price(extra.price)?;
        if choices.iter().any(|c| c.id == extra.id) {
            return Err(OrderError::InvalidOperation(format!(
                "duplicate extra {} in selection",
                extra_id
            )));
        }
        choices.push(ExtraChoice {
            id: extra.id.clone(),
            name: extra.name.clone(),
            price: extra.price,
            quantity: *quantity,
        });
    }

    Ok((
        ProductRef {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        },
        variety,
        choices,
    ))
}

/// Validate the parameters of a weighed sale and snapshot them.
pub(crate) fn build_weighed(
    product: &Product,
    weight_kg: Decimal,
    price_per_kg: Decimal,
    description: &str,
) -> OrderResult<ProductRef> {
    if !product.is_active {
        return Err(OrderError::InactiveSelection(product.id.clone()));
    }
    if weight_kg <= Decimal::ZERO {
        return Err(OrderError::InvalidWeight(weight_kg));
    }
    if price_per_kg <= Decimal::ZERO {
        return Err(OrderError::InvalidPrice(price_per_kg));
    }
    pricing::require_price(price_per_kg)?;

    Ok(ProductRef {
        id: product.id.clone(),
        name: description.to_string(),
        price: price_per_kg,
    })
}

/// Mutable cart
///
/// Insertion order is preserved for display; at most one line exists per
/// content key, weighed lines excepted.
#[derive(Debug, Clone, Default)]
pub struct CartDraft {
    lines: Vec<CartLine>,
}

impl CartDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, line_key: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_key == line_key)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add a catalog selection; merges into an existing line with the
    /// same content key, otherwise appends. Returns the line key.
    pub fn add_selection(
        &mut self,
        product: &Product,
        variety_id: Option<&str>,
        extras: &[(&str, u32)],
        quantity: i32,
    ) -> OrderResult<String> {
        pricing::require_quantity(quantity)?;
        let (product_ref, variety, extra_choices) =
            build_selection(product, variety_id, extras)?;
        let key = keying::line_key(
            &product_ref.id,
            variety.as_ref().map(|v| v.id.as_str()),
            &extra_choices,
        );

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| !l.is_weighed() && l.line_key == key)
        {
            let merged = line.quantity + quantity;
            pricing::require_quantity(merged)?;
            line.quantity = merged;
            // Refresh the snapshots so a catalog price change between two
            // adds wins over the stale copy
            line.product = product_ref;
            line.variety = variety;
            line.extras = extra_choices;
            debug!(line_key = %key, quantity = merged, "merged selection into existing line");
            return Ok(key);
        }

        debug!(line_key = %key, quantity, "appended cart line");
        self.lines.push(CartLine {
            line_key: key.clone(),
            product: product_ref,
            variety,
            extras: extra_choices,
            quantity,
            weight: None,
            note: None,
        });
        Ok(key)
    }

    /// Add a weighed sale. Always appends: two identical weighed entries
    /// are distinct sales. Returns the line key.
    pub fn add_weighed_item(
        &mut self,
        product: &Product,
        weight_kg: Decimal,
        price_per_kg: Decimal,
        description: &str,
    ) -> OrderResult<String> {
        let product_ref = build_weighed(product, weight_kg, price_per_kg, description)?;
        let key = keying::unique_line_key();

        debug!(line_key = %key, weight = %weight_kg, "appended weighed line");
        self.lines.push(CartLine {
            line_key: key.clone(),
            product: product_ref,
            variety: None,
            extras: vec![],
            quantity: 1,
            weight: Some(weight_kg),
            note: None,
        });
        Ok(key)
    }

    /// Set a line's quantity; 0 removes the line. Weighed lines have a
    /// fixed quantity of 1.
    pub fn set_quantity(&mut self, line_key: &str, quantity: i32) -> OrderResult<()> {
        if quantity < 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let idx = self
            .lines
            .iter()
            .position(|l| l.line_key == line_key)
            .ok_or_else(|| OrderError::LineNotFound(line_key.to_string()))?;

        if quantity == 0 {
            self.lines.remove(idx);
            return Ok(());
        }

        let line = &mut self.lines[idx];
        if line.is_weighed() {
            return Err(OrderError::InvalidOperation(
                "quantity is fixed at 1 for weighed lines".to_string(),
            ));
        }
        pricing::require_quantity(quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line, returning it
    pub fn remove(&mut self, line_key: &str) -> OrderResult<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.line_key == line_key)
            .ok_or_else(|| OrderError::LineNotFound(line_key.to_string()))?;
        Ok(self.lines.remove(idx))
    }

    /// Sum of extended prices
    pub fn subtotal(&self) -> Decimal {
        pricing::order_total(&self.lines, Decimal::ZERO)
    }

    /// Total unit count; weighed lines count as 1 regardless of weight
    pub fn item_count(&self) -> i32 {
        self.lines
            .iter()
            .map(|l| if l.is_weighed() { 1 } else { l.quantity })
            .sum()
    }
}
