use std::sync::Arc;

use minidb::*;

fn main() -> Result<()> {
    println!("In-Memory Database Demo\n");

    // Create DB
    let mut db = Database::new();

    // Create table "users" through the API
    let mut users = Table::with_columns(
        "users",
        vec![
            ColumnDef::new("id", DataType::Int),
            ColumnDef::new("name", DataType::Text),
            ColumnDef::new("age", DataType::Int),
        ],
    );
    users.set_primary_key_by_name(&["id"])?;
    db.create_table(users)?;
    println!("Created table 'users'");

    // Insert data
    println!("Inserting data...");
    {
        let table = db
            .get_table_mut("users")
            .ok_or_else(|| Error::Lookup("table \"users\"".into()))?;

        table.insert(vec![
            Value::Int(1),
            Value::Text(Arc::from("Alice")),
            Value::Int(30),
        ])?;

        table.insert(vec![
            Value::Int(2),
            Value::Text(Arc::from("Bob")),
            Value::Null, // Bob's age is unknown
        ])?;

        println!("Inserted 2 rows\n");
    }

    // The rest goes through SQL
    db.execute("INSERT INTO users (name, id, age) VALUES ('Charlie', 3, 25);")?;
    if let Err(err) = db.execute("INSERT INTO users VALUES (1, 'Again', 40);") {
        println!("Rejected duplicate key: {err}\n");
    }

    db.execute("CREATE TABLE pets (owner int, species varchar(16));")?;
    db.execute("INSERT INTO pets VALUES (1, 'cat'), (3, 'dog'), (3, 'fish');")?;

    println!("{}", db.query("SELECT * FROM users;")?);
    println!("{}", db.query("SELECT name, age FROM users WHERE age = NULL OR age < 28;")?);
    println!(
        "{}",
        db.query("SELECT name, species FROM users LEFT JOIN pets ON users.id = pets.owner;")?
    );

    // Update Bob's age
    db.execute("UPDATE users SET age = 41 WHERE name = 'Bob';")?;
    let outcome = db.execute("DELETE FROM pets WHERE species != 'cat';")?;
    println!("{outcome}");

    println!("{}", db.query("SELECT * FROM users WHERE NOT age < 30;")?);
    Ok(())
}
