table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        password_hash -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
    }
}

table! {
    calendars (id) {
        id -> Int4,
        name -> Varchar,
        case -> Int8,
        owner_id -> Int4,
    }
}

table! {
    events (id) {
        id -> Int4,
        from_calendar_id -> Int4,
        to_calendar_id -> Int4,
        case -> Int8,
        created_at -> Timestamptz,
    }
}

joinable!(calendars -> users (owner_id));

allow_tables_to_appear_in_same_query!(
    calendars,
    events,
    users,
);
