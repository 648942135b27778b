// Diesel table definitions matching the embedded migrations.

diesel::table! {
    cycles (id) {
        id -> BigInt,
        start_date -> Date,
        end_date -> Date,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    predictions (id) {
        id -> BigInt,
        text -> Text,
        created_at -> Timestamp,
        cycle_length -> Integer,
        next_start -> Date,
        pms_start -> Date,
        pms_end -> Date,
        period_length -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(cycles, predictions);
