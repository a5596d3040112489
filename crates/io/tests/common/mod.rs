// Fixture databases shaped like the two operational stores.
#![allow(dead_code)]

use std::path::Path;

use rusqlite::Connection;

pub const SERVER_SCHEMA: &str = r#"
CREATE TABLE Customers (
    CustomerID TEXT PRIMARY KEY,
    CompanyName TEXT NOT NULL
);
CREATE TABLE Employees (
    EmployeeID INTEGER PRIMARY KEY,
    FirstName TEXT,
    LastName TEXT
);
CREATE TABLE Orders (
    OrderID INTEGER PRIMARY KEY,
    CustomerID TEXT,
    EmployeeID INTEGER,
    OrderDate TEXT,
    ShippedDate TEXT,
    Freight REAL,
    ShipCity TEXT,
    ShipCountry TEXT
);
"#;

pub const SERVER_DATA: &str = r#"
INSERT INTO Customers VALUES ('VINET', 'Vins et alcools Chevalier');
INSERT INTO Customers VALUES ('TOMSP', '  Toms Spezialitäten ');
INSERT INTO Employees VALUES (5, 'Steven', 'Buchanan');
INSERT INTO Employees VALUES (6, 'Michael', 'Suyama');
INSERT INTO Orders VALUES (10248, 'VINET', 5, '1996-07-04 00:00:00', '1996-07-16 00:00:00', 32.38, 'Reims', 'France');
INSERT INTO Orders VALUES (10249, 'TOMSP', 6, '1996-07-05 00:00:00', '1996-07-10 00:00:00', 11.61, 'Münster', 'Germany');
INSERT INTO Orders VALUES (10250, 'VINET', 5, '1996-07-08 00:00:00', NULL, 65.83, 'Reims', 'France');
INSERT INTO Orders VALUES (10251, 'TOMSP', 99, 'not a date', '1996-07-15', 41.34, ' lyon ', NULL);
"#;

pub const FILE_SCHEMA: &str = r#"
CREATE TABLE Customers (
    ID INTEGER PRIMARY KEY,
    Company TEXT
);
CREATE TABLE Employees (
    ID INTEGER PRIMARY KEY,
    [First Name] TEXT,
    [Last Name] TEXT
);
CREATE TABLE Orders (
    [Order ID] INTEGER PRIMARY KEY,
    [Employee ID] INTEGER,
    [Customer ID] INTEGER,
    [Order Date] TEXT,
    [Shipped Date] TEXT,
    [Ship City] TEXT,
    [Ship Country/Region] TEXT,
    [Payment Type] TEXT
);
"#;

pub const FILE_DATA: &str = r#"
INSERT INTO Customers VALUES (1, 'Company A');
INSERT INTO Customers VALUES (4, 'Company D');
INSERT INTO Employees VALUES (9, 'Anne', 'Hellung-Larsen');
INSERT INTO Employees VALUES (3, 'Jan', 'Kotas');
INSERT INTO Orders VALUES (30, 9, 1, '2006-01-15 00:00:00', '2006-01-22 00:00:00', 'Las Vegas', 'USA', 'Check');
INSERT INTO Orders VALUES (31, 3, 4, '2006-01-20 00:00:00', NULL, 'New York', 'USA', NULL);
INSERT INTO Orders VALUES (32, 3, 4, '2006-01-22 00:00:00', '2006-01-22 00:00:00', 'New York', 'USA', 'Credit Card');
"#;

pub fn create_db(path: &Path, schema: &str, data: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(schema).unwrap();
    conn.execute_batch(data).unwrap();
}

pub fn count(path: &Path, table: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |r| r.get(0))
        .unwrap()
}
