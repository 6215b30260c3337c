use serde::Serialize;
use std::io;

use crate::model::Client;

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    account_number: &'a str,
    name: String,
    balance: String,
}

/// Write every client's balance in csv format
pub fn write_balances<'a, W: io::Write>(
    out: W,
    clients: impl IntoIterator<Item = &'a Client>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    for client in clients {
        let row = BalanceRow {
            account_number: client.account_number(),
            name: client.person.full_name(),
            balance: client.balance().to_string(),
        };
        writer.serialize(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::model::Person;

    fn client(account: &str, first: &str, balance: i64) -> Client {
        let person = Person {
            first_name: first.into(),
            last_name: "Doe".into(),
            ..Person::default()
        };
        Client::stored(person, account, "0", Amount::from_units(balance))
    }

    #[test]
    fn writes_header_and_rows() {
        let clients = [client("A1", "Jane", 100), client("A2", "John", 5)];
        let mut out = Vec::new();
        write_balances(&mut out, &clients).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "account_number,name,balance");
        assert_eq!(lines[1], "A1,Jane Doe,100.0000");
        assert_eq!(lines[2], "A2,John Doe,5.0000");
    }

    #[test]
    fn no_clients_writes_nothing() {
        let mut out = Vec::new();
        write_balances(&mut out, &Vec::<Client>::new()).unwrap();
        assert!(out.is_empty());
    }
}
