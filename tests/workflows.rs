use bank_records::audit::{FixedClock, TransferLogger};
use bank_records::console::ScriptedConsole;
use bank_records::engine::read_withdraw_amount;
use bank_records::menu::App;
use bank_records::model::Entity;
use bank_records::repository::{ClientRepository, UserRepository};
use bank_records::session::Session;
use bank_records::workflow::{self, UpdateOutcome};
use bank_records::{Amount, Capability, Client, Config, Engine, Permissions, Person, User};
use tempfile::TempDir;

fn units(n: i64) -> Amount {
    Amount::from_units(n)
}

fn client(account: &str, balance: i64) -> Client {
    Client::stored(Person::default(), account, "0000", units(balance))
}

#[test]
fn add_client_to_empty_store() {
    let dir = TempDir::new().unwrap();
    let config = Config::in_dir(dir.path());
    let clients = ClientRepository::new(config.clients);
    let mut console =
        ScriptedConsole::new(["1001", "Ada", "Lovelace", "ada@example.com", "555", "4242", "500"]);

    workflow::add_new(&clients, &mut console).unwrap();

    let stored = clients.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].account_number(), "1001");
    assert_eq!(stored[0].balance(), units(500));
}

#[test]
fn withdraw_over_balance_never_reaches_the_engine() {
    let dir = TempDir::new().unwrap();
    let clients = ClientRepository::new(dir.path().join("Clients.txt"));
    clients.save_all(&[client("A1", 100)]).unwrap();
    let engine = Engine::new(clients.clone());

    // 150 is refused, the operator then backs off to 60 and declines
    let mut console = ScriptedConsole::new(["150", "60", "n"]);
    let balance = clients.find_by_key("A1").unwrap().unwrap().balance();
    let amount = read_withdraw_amount(&mut console, "Withdraw amount", balance).unwrap();
    assert_eq!(amount, units(60));
    assert!(console.printed("you can withdraw up to"));

    assert_eq!(engine.withdraw(&mut console, "A1", amount).unwrap(), None);
    assert_eq!(clients.find_by_key("A1").unwrap().unwrap().balance(), units(100));
}

#[test]
fn update_only_user_permissions() {
    let session = Session::new(User::stored(
        Person::default(),
        "clerk",
        "pw",
        Permissions::Bits(8),
    ));

    assert!(!session.has_permission(Capability::DeleteClient));
    assert!(session.has_permission(Capability::UpdateClient));
}

#[test]
fn full_access_allows_unknown_bits() {
    assert!(Permissions::Full.allows_bits(1 << 20));
    assert!(!Permissions::Bits(255).allows_bits(1 << 20));
}

#[test]
fn admin_update_is_rejected_before_any_change() {
    let dir = TempDir::new().unwrap();
    let users = UserRepository::new(dir.path().join("Users.txt"));
    users
        .save_all(&[User::stored(Person::default(), "Admin", "1234", Permissions::Full)])
        .unwrap();
    let before = users.load_all().unwrap();
    let mut console = ScriptedConsole::new(["Admin", "y"]);

    let outcome = workflow::update(&users, &mut console).unwrap();

    assert_eq!(outcome, UpdateOutcome::Protected);
    assert_eq!(users.load_all().unwrap(), before);
}

#[test]
fn transfer_conserves_money_and_is_logged() {
    let dir = TempDir::new().unwrap();
    let clients = ClientRepository::new(dir.path().join("Clients.txt"));
    clients.save_all(&[client("S", 300), client("D", 20)]).unwrap();
    let engine = Engine::new(clients.clone());
    let transfers = TransferLogger::new(dir.path().join("Transfer.txt"));
    let clock = FixedClock("9/9/2024 - 9:9:9".into());

    let mut working = clients.load_all().unwrap();
    let mut console = ScriptedConsole::new(["y"]);
    let (source_balance, destination_balance) = engine
        .transfer(&mut console, &mut working, "S", "D", units(120))
        .unwrap()
        .unwrap();
    transfers
        .record(&working[0], &working[1], units(120), "Admin", &clock)
        .unwrap();

    assert_eq!(source_balance, units(180));
    assert_eq!(destination_balance, units(140));
    let log = transfers.list().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].amount, units(120));
    assert_eq!(log[0].source_balance, source_balance);
    assert_eq!(log[0].destination_balance, destination_balance);
}

#[test]
fn declined_transfer_keeps_stored_balances() {
    let dir = TempDir::new().unwrap();
    let clients = ClientRepository::new(dir.path().join("Clients.txt"));
    clients.save_all(&[client("S", 300), client("D", 20)]).unwrap();
    let engine = Engine::new(clients.clone());

    let mut working = clients.load_all().unwrap();
    let mut console = ScriptedConsole::new(["n"]);
    let result = engine
        .transfer(&mut console, &mut working, "S", "D", units(120))
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(clients.total_balance().unwrap(), units(320));
    assert_eq!(clients.find_by_key("S").unwrap().unwrap().balance(), units(300));
}

#[test]
fn deleted_clients_are_not_saved() {
    let dir = TempDir::new().unwrap();
    let clients = ClientRepository::new(dir.path().join("Clients.txt"));
    let mut working = vec![client("A1", 1), client("A2", 2), client("A3", 3)];
    working[1].mark_deleted();

    let written = clients.save_all(&working).unwrap();

    assert_eq!(written, 2);
    let keys: Vec<String> = clients
        .load_all()
        .unwrap()
        .iter()
        .map(|c| c.account_number().to_string())
        .collect();
    assert_eq!(keys, ["A1", "A3"]);
}

#[test]
fn staff_session_from_login_to_lockout() {
    let dir = TempDir::new().unwrap();
    let app = App::new(
        &Config::in_dir(dir.path()),
        Box::new(FixedClock("1/1/2025 - 0:0:0".into())),
    );
    app.ensure_admin().unwrap();

    // login, add client 7, find it, logout, three bad logins
    let mut console = ScriptedConsole::new(["Admin", "1234", "2"]);
    for answer in ["7", "Grace", "Hopper", "g@h", "1", "9999", "75"] {
        console.push(answer);
    }
    for answer in ["5", "7", "9"] {
        console.push(answer);
    }
    for _ in 0..6 {
        console.push("wrong");
    }

    app.run(&mut console).unwrap();

    assert!(console.printed("Client added successfully."));
    assert!(console.printed("Client found."));
    assert!(console.printed("No more tries left"));
    assert!(console.is_exhausted());

    let clients = ClientRepository::new(dir.path().join("Clients.txt"));
    assert_eq!(clients.find_by_key("7").unwrap().unwrap().balance(), units(75));
}
