// Database schema for the food-ordering services
diesel::table! {
    restaurants (id) {
        id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        image_url -> Nullable<Text>,
        address -> Text,               // JSON document
        phone -> Nullable<Text>,
        email -> Nullable<Text>,
        website -> Nullable<Text>,
        cuisine_types -> Text,         // JSON array
        opening_hours -> Nullable<Text>,
        delivery_info -> Nullable<Text>,
        rating -> Nullable<Double>,
        review_count -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    menu_items (id) {
        id -> Text,
        restaurant_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        price -> Double,
        category -> Nullable<Text>,
        image_url -> Nullable<Text>,
        is_available -> Bool,
        ingredients -> Text,           // JSON array
        allergen_info -> Text,         // JSON array
        nutritional_info -> Nullable<Text>,
        popularity -> BigInt,          // units ordered, bumped by events
    }
}

diesel::table! {
    users (id) {
        id -> Text,
        email -> Text,
        password_hash -> Text,
        name -> Text,
        phone -> Nullable<Text>,
        role -> Text,
        is_active -> Bool,
        addresses -> Text,             // JSON array
        preferences -> Text,           // JSON document
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    orders (id) {
        id -> Text,
        user_id -> Text,
        restaurant_id -> Text,
        status -> Text,
        total_amount -> Double,
        delivery_fee -> Double,
        tax_amount -> Double,
        delivery_address -> Nullable<Text>,
        special_instructions -> Nullable<Text>,
        estimated_delivery_time -> Nullable<Timestamp>,
        actual_delivery_time -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    order_items (id) {
        id -> Text,
        order_id -> Text,
        menu_item_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        price -> Double,
        quantity -> Integer,
        special_instructions -> Nullable<Text>,
    }
}

diesel::table! {
    order_events (id) {
        id -> Text,
        order_id -> Text,
        event_type -> Text,
        description -> Text,
        metadata -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    payments (id) {
        id -> Text,
        order_id -> Text,
        user_id -> Text,
        amount -> Double,
        currency -> Text,
        status -> Text,
        method -> Text,
        transaction_id -> Text,
        gateway_metadata -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    refunds (id) {
        id -> Text,
        payment_id -> Text,
        amount -> Double,
        reason -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    payment_methods (id) {
        id -> Text,
        user_id -> Text,
        kind -> Text,
        label -> Nullable<Text>,
        last_four -> Nullable<Text>,
        is_default -> Bool,
        created_at -> Timestamp,
    }
}

diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_events -> orders (order_id));
diesel::joinable!(refunds -> payments (payment_id));
diesel::joinable!(menu_items -> restaurants (restaurant_id));

diesel::allow_tables_to_appear_in_same_query!(
    restaurants,
    menu_items,
    users,
    orders,
    order_items,
    order_events,
    payments,
    refunds,
    payment_methods,
);
