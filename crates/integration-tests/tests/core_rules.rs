//! Shared business rules, checked without a server.

use heavyshop_core::cart::{CartError, CartLine, check_add};
use heavyshop_core::pricing::{OrderQuote, QuoteError, order_total};
use heavyshop_core::{BookId, Rating};
use rust_decimal::Decimal;

fn line(id: i32, cents: i64, quantity: i32, stock: i32) -> CartLine {
    CartLine {
        book_id: BookId::from(id),
        title: format!("Book {id}"),
        unit_price: Decimal::new(cents, 2),
        quantity,
        stock,
    }
}

#[test]
fn test_out_of_stock_add_is_refused() {
    assert_eq!(check_add(0, 1, 0), Err(CartError::OutOfStock));
    assert_eq!(
        check_add(2, 1, 2),
        Err(CartError::InsufficientStock { available: 2 })
    );
    assert_eq!(check_add(1, 1, 2), Ok(2));
}

#[test]
fn test_quote_total_is_sum_of_lines() {
    let quote = OrderQuote::new(vec![line(1, 1450, 2, 5), line(2, 335, 3, 5)], 0)
        .unwrap_or_else(|e| panic!("{e}"));
    let expected: Decimal = quote
        .lines
        .iter()
        .map(|l| l.unit_price * Decimal::from(l.quantity))
        .sum();

    assert_eq!(quote.subtotal, expected);
    assert_eq!(quote.total, Decimal::new(3905, 2));
}

#[test]
fn test_discount_comes_off_the_subtotal() {
    let quote =
        OrderQuote::new(vec![line(1, 2000, 1, 1)], 10).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(quote.discount, Decimal::new(200, 2));
    assert_eq!(quote.total, Decimal::new(1800, 2));
    assert_eq!(
        order_total(&[Decimal::new(2000, 2)], Some(10)),
        quote.total
    );
}

#[test]
fn test_quote_refuses_short_stock_and_empty_cart() {
    assert!(matches!(
        OrderQuote::new(vec![line(1, 100, 3, 2)], 0),
        Err(QuoteError::InsufficientStock { .. })
    ));
    assert!(matches!(OrderQuote::new(Vec::new(), 0), Err(QuoteError::EmptyCart)));
}

#[test]
fn test_rating_range() {
    for value in [Rating::MIN, 3, Rating::MAX] {
        assert!(Rating::new(value).is_ok());
    }
    for value in [0, 6, -1] {
        assert!(Rating::new(value).is_err());
    }
}
