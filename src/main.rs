fn main() {
    horde_survivor::game::run();
}
