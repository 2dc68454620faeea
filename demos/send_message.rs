use std::io;

use smsportal::{ClientId, ClientSecret, Destination, MessageText, SendMessage, SmsPortalClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client_id = std::env::var("SMSPORTAL_CLIENT_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSPORTAL_CLIENT_ID environment variable is required",
        )
    })?;
    let secret = std::env::var("SMSPORTAL_SECRET").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSPORTAL_SECRET environment variable is required",
        )
    })?;
    let phone = std::env::var("SMSPORTAL_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSPORTAL_PHONE environment variable is required",
        )
    })?;
    let message = std::env::var("SMSPORTAL_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsportal example.".to_owned());

    let client = SmsPortalClient::new(ClientId::new(client_id)?, ClientSecret::new(secret)?)?;
    let request = SendMessage::single(Destination::new(phone)?, MessageText::new(message)?);

    let response = client.send_message(request).await?;
    println!("response: {}", serde_json::Value::Object(response));

    Ok(())
}
