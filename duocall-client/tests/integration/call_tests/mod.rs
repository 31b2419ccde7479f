mod test_hang_up_rearms;
mod test_media_denied_ends_visit;
mod test_room_full_turns_third_away;
mod test_two_participants_connect;
