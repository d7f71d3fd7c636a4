//! HTML bodies and subjects for the storefront's transactional emails.

use crate::configuration::EmailSettings;
use crate::core::{Order, OrderItem, StatusLabel, SHIPPED_STATUS};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

const BASE_CSS: &str = "
      body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
      .container { max-width: 600px; margin: 0 auto; padding: 20px; }
      .header { background: linear-gradient(135deg, #9333ea 0%, #7c3aed 100%); color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }
      .content { background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px; }
      .footer { text-align: center; margin-top: 30px; color: #666; font-size: 12px; }";

const CONFIRMATION_CSS: &str = "
      .order-details { background: white; padding: 20px; border-radius: 5px; margin: 20px 0; }
      table { width: 100%; border-collapse: collapse; margin: 20px 0; }
      th { background: #f0f0f0; padding: 10px; text-align: left; }
      td { padding: 10px; border-bottom: 1px solid #eee; }
      .total { font-size: 18px; font-weight: bold; color: #9333ea; margin-top: 20px; text-align: right; }
      .alert { background: #fef3c7; border-left: 4px solid #f59e0b; padding: 15px; margin: 20px 0; }";

const STATUS_CSS: &str = "
      .status-badge { display: inline-block; padding: 10px 20px; background: #10b981; color: white; border-radius: 20px; font-weight: bold; margin: 20px 0; }
      .order-info { background: white; padding: 20px; border-radius: 5px; margin: 20px 0; }";

const WELCOME_CSS: &str = "
      .button { display: inline-block; padding: 12px 30px; background: #9333ea; color: white; text-decoration: none; border-radius: 5px; margin: 20px 0; }";

pub fn order_confirmation(
    order: &Order,
    items: &[OrderItem],
    settings: &EmailSettings,
) -> RenderedEmail {
    let reference = escape_html(&order.reference());
    let customer_name = escape_html(&order.customer_name);
    let account = &settings.payment_account;

    let rows: String = items
        .iter()
        .map(|item| {
            format!(
                r#"
            <tr>
              <td>{}</td>
              <td style="text-align: center;">{}</td>
              <td style="text-align: right;">{}</td>
              <td style="text-align: right;">{}</td>
            </tr>"#,
                escape_html(&item.product_name),
                item.quantity,
                format_naira(item.price),
                format_naira(item.line_total()),
            )
        })
        .collect();

    let content = format!(
        r#"
      <p>Hi {customer_name},</p>
      <p>Thank you for your order! We've received your order and will begin processing it once payment is confirmed.</p>
      <div class="alert">
        <strong>⚠️ Important:</strong> Please complete your payment to the account details below and keep your payment receipt.
      </div>
      <div class="order-details">
        <h2>Order Details</h2>
        <table>
          <thead>
            <tr>
              <th>Product</th>
              <th style="text-align: center;">Qty</th>
              <th style="text-align: right;">Price</th>
              <th style="text-align: right;">Total</th>
            </tr>
          </thead>
          <tbody>{rows}
          </tbody>
        </table>
        <div class="total">Total: {total}</div>
      </div>
      <div class="order-details">
        <h3>Delivery Information</h3>
        <p><strong>Method:</strong> {method}</p>
        <p><strong>Address:</strong> {address}</p>
        <p><strong>Phone:</strong> {phone}</p>
      </div>
      <div class="order-details">
        <h3>Payment Information</h3>
        <p><strong>Account Name:</strong> {account_name}</p>
        <p><strong>Bank:</strong> {bank}</p>
        <p><strong>Account Number:</strong> {account_number}</p>
        <p style="margin-top: 15px; color: #666;">
          <em>Please use your name "{customer_name}" as the payment reference.</em>
        </p>
      </div>
      <p>Once we confirm your payment, we'll send you another email with tracking information.</p>
      <p>If you have any questions about your order, please contact us.</p>
      <p><strong>The {brand} Team</strong></p>"#,
        total = format_naira(order.total),
        method = order.delivery_method().label(),
        address = escape_html(&order.customer_address),
        phone = escape_html(&order.customer_phone),
        account_name = escape_html(&account.account_name),
        bank = escape_html(&account.bank),
        account_number = escape_html(&account.account_number),
        brand = escape_html(&settings.brand_name),
    );

    let header = format!("<h1>Order Confirmed! 🎉</h1>\n      <p>Order #{}</p>", reference);

    RenderedEmail {
        subject: format!("Order Confirmation - {}", order.reference()),
        html: layout(&header, &content, CONFIRMATION_CSS, settings),
    }
}

pub fn status_update(
    order: &Order,
    status: &str,
    label: &StatusLabel,
    settings: &EmailSettings,
) -> RenderedEmail {
    let reference = escape_html(&order.reference());

    let delivery_block = if status == SHIPPED_STATUS {
        format!(
            r#"
      <div class="order-info">
        <h3>Delivery Information</h3>
        <p>Your order will be delivered to:</p>
        <p><strong>{}</strong></p>
        <p>Please ensure someone is available to receive the package.</p>
      </div>"#,
            escape_html(&order.customer_address)
        )
    } else {
        String::new()
    };

    let content = format!(
        r#"
      <p>Hi {customer_name},</p>
      <p>{message}</p>
      <div class="order-info">
        <h3>Order Information</h3>
        <p><strong>Order Number:</strong> {reference}</p>
        <p><strong>Total:</strong> {total}</p>
        <p><strong>Status:</strong> <span class="status-badge">{badge}</span></p>
      </div>{delivery_block}
      <p>If you have any questions about your order, please don't hesitate to contact us.</p>
      <p><strong>The {brand} Team</strong></p>"#,
        customer_name = escape_html(&order.customer_name),
        message = escape_html(&label.message),
        total = format_naira(order.total),
        badge = escape_html(&status.to_uppercase()),
        brand = escape_html(&settings.brand_name),
    );

    let header = format!(
        "<h1>{} {}</h1>",
        escape_html(&label.icon),
        escape_html(&label.title)
    );

    RenderedEmail {
        subject: format!(
            "{} {} - Order #{}",
            label.icon,
            label.title,
            order.reference()
        ),
        html: layout(&header, &content, STATUS_CSS, settings),
    }
}

pub fn welcome(name: Option<&str>, settings: &EmailSettings) -> RenderedEmail {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there");
    let brand = escape_html(&settings.brand_name);

    let content = format!(
        r#"
      <p>Hi {name},</p>
      <p>Thank you for joining {brand}! We're thrilled to have you as part of our fashion-forward community.</p>
      <p>Here's what you can do now:</p>
      <ul>
        <li>Browse our latest collection of trendy apparel</li>
        <li>Save your favorite items to your wishlist</li>
        <li>Enjoy seamless checkout with multiple delivery options</li>
        <li>Track your orders in real-time</li>
      </ul>
      <a href="{shop_url}" class="button">Start Shopping</a>
      <p>If you have any questions, feel free to reach out to our support team.</p>
      <p>Happy shopping!</p>
      <p><strong>The {brand} Team</strong></p>"#,
        name = escape_html(name),
        shop_url = escape_html(&format!(
            "{}/products",
            settings.site_url.trim_end_matches('/')
        )),
    );

    RenderedEmail {
        subject: format!("Welcome to {}! 🎉", settings.brand_name),
        html: layout(
            &format!("<h1>Welcome to {}!</h1>", brand),
            &content,
            WELCOME_CSS,
            settings,
        ),
    }
}

fn layout(header: &str, content: &str, extra_css: &str, settings: &EmailSettings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <style>{base_css}{extra_css}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
      {header}
      </div>
      <div class="content">{content}
      </div>
      <div class="footer">
        <p>© {year} {brand}. All rights reserved.</p>
        <p>{address}</p>
      </div>
    </div>
  </body>
</html>
"#,
        base_css = BASE_CSS,
        year = chrono::Utc::now().format("%Y"),
        brand = escape_html(&settings.brand_name),
        address = escape_html(&settings.footer_address),
    )
}

/// Naira amount with thousands separators and at most two decimals, e.g. `₦12,500.5`.
pub fn format_naira(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let kobo = (amount.abs() * 100.0).round() as u64;
    let whole = (kobo / 100).to_string();
    let fraction = kobo % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let fraction = match fraction {
        0 => String::new(),
        f if f % 10 == 0 => format!(".{}", f / 10),
        f => format!(".{:02}", f),
    };

    format!("{}₦{}{}", sign, grouped, fraction)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
